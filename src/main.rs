use clap::Parser;
use miette::Result;
use partstracker::cli::{Cli, Commands};
use partstracker::cli::commands;

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`ptrack part list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    partstracker::logging::init(global.verbose, global.quiet);
    tracing::debug!(command = ?cli.command, "starting");

    match cli.command {
        Commands::File(cmd) => commands::file::run(cmd, &global),
        Commands::Item(cmd) => commands::item::run(cmd, &global),
        Commands::Asm(cmd) => commands::asm::run(cmd, &global),
        Commands::Part(cmd) => commands::part::run(cmd, &global),
        Commands::Order(cmd) => commands::order::run(cmd, &global),
        Commands::Condition(cmd) => commands::condition::run(cmd, &global),
        Commands::Source(cmd) => commands::source::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
