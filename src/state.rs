use std::sync::Arc;

use anyhow::Result;
use handlebars::Handlebars;

use crate::client::NewsClient;
use crate::config::Config;
use crate::template;

#[derive(Clone)]
pub struct State {
    pub cfg: Arc<Config>,
    pub client: Arc<NewsClient>,
    pub template: Arc<Handlebars<'static>>,
}

impl State {
    pub fn new(cfg: Config) -> Result<Self> {
        let client = Arc::new(NewsClient::new(&cfg)?);
        let cfg = Arc::new(cfg);
        let template = Arc::new(template::new());

        Ok(State {
            cfg,
            client,
            template,
        })
    }
}
