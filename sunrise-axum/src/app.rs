use std::sync::Arc;

use axum::handler::Handler;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use sunrise_core::SunriseApp;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middlewares::{ssl, sunrise};
use crate::SunriseAxumState;

pub struct AxumApp {
    pub app: Arc<SunriseApp>,
    pub router: Router<()>,
}

impl Clone for AxumApp {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
        }
    }
}

impl AxumApp {
    pub fn new(app: SunriseApp) -> Self {
        Self {
            app: Arc::new(app),
            router: Router::new(),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = if path == "/" {
            self.router.merge(router)
        } else {
            self.router.nest(path, router)
        };
        self
    }

    pub fn r#use(self, path: &str, router: Router<()>) -> Self {
        self.use_router(path, router)
    }

    /// Mount a GET handler at `path`.
    pub fn use_get<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    pub fn service<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + 'static,
        T: 'static,
    {
        self.use_get(path, handler)
    }

    /// The router with the multisite layers wrapped around every route.
    ///
    /// Outermost first: request id, tracing, bootstrap, HTTPS redirect,
    /// HTTPS link rewriting.
    pub fn into_router(self) -> Router<()> {
        let state = SunriseAxumState::new(self.app);

        self.router
            .layer(middleware::from_fn(ssl::https_links))
            .layer(middleware::from_fn(ssl::enforce_https))
            .layer(middleware::from_fn_with_state(state, sunrise::bootstrap))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

pub fn axum(app: SunriseApp) -> AxumApp {
    AxumApp::new(app)
}
