mod cli;
mod live;
mod logging;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
