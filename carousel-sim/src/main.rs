use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = carousel_sim::options::Cli::parse();

    flexi_logger::Logger::try_with_env_or_str(
        cli.verbosity.log_level_filter().as_str().to_lowercase(),
    )?
    .set_palette("b1;3;2;4;6".to_string())
    .start()?;

    carousel_sim::execute(cli)
}
