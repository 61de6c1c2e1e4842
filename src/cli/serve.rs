use crate::config::ServerConfig;
use crate::Result;
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (default: 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port (default: 8000)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Overlay the flags that were given onto `config`
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

pub async fn run(args: ServeArgs, mut config: ServerConfig) -> Result<()> {
    args.apply(&mut config);
    crate::api::start_server(&config).await
}
