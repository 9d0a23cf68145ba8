use serde::{Deserialize, Serialize};

use crate::gateway::ApiInfo;

/// Login form posted by the browser
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Landing page model
#[derive(Debug, Serialize, Deserialize)]
pub struct LandingView {
    pub authenticated: bool,
    pub username: Option<String>,
    pub api_info: ApiInfo,
}
