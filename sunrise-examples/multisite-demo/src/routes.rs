use std::sync::Arc;

use axum::extract::Path;
use axum::Json;
use serde::Serialize;
use sunrise_axum::{CurrentSite, CurrentUrls, SunriseAxumError};
use sunrise_core::{Network, NetworkId, Site, SunriseApp, SunriseError, UserId};

#[derive(Serialize)]
pub struct SiteInfo {
    site: Site,
    network: Network,
    main_site: bool,
    home_url: String,
    site_url: String,
}

pub async fn current_site(CurrentSite(ctx): CurrentSite, CurrentUrls(urls): CurrentUrls) -> Json<SiteInfo> {
    let main_site = ctx.is_main_site();
    Json(SiteInfo {
        site: ctx.site,
        network: ctx.network,
        main_site,
        home_url: urls.home,
        site_url: urls.site,
    })
}

pub async fn network_link(CurrentUrls(urls): CurrentUrls, Path(path): Path<String>) -> String {
    urls.network_site_url(&path)
}

/// Networks the user may administer, or 403 when there are none.
pub async fn user_networks(app: Arc<SunriseApp>, id: u64) -> Result<Json<Vec<NetworkId>>, SunriseAxumError> {
    let Some(privileges) = app.privileges() else {
        return Err(SunriseError::forbidden("No admins configured").into());
    };

    let all = app.sites().network_ids().await?;
    privileges
        .user_networks(UserId(id), &all)
        .await
        .map(Json)
        .ok_or_else(|| SunriseError::forbidden(format!("User {id} administers no network")).into())
}
