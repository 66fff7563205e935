use crate::checker::Checker;
use crate::config::Config;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub checker: Checker,
    pub sessions: SessionStore,
}
