use std::sync::Arc;

use sunrise_core::SunriseApp;

#[derive(Clone)]
pub struct SunriseAxumState {
    pub app: Arc<SunriseApp>,
}

impl SunriseAxumState {
    pub fn new(app: Arc<SunriseApp>) -> Self {
        Self { app }
    }
}
