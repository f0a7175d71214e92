use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "spybox-serve",
    author,
    version,
    about = "HTTP API for the spybox sandbox runner"
)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = spybox::server::serve(args.port).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
