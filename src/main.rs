fn main() {
    use clap::Parser;
    use std::error::Error;
    let args = swexport::cli::Args::parse();
    if let Err(e) = swexport::cli::run(&args) {
        let top = e.to_string();
        eprintln!("{}", top);
        if args.verbose {
            let mut source = e.source();
            while let Some(s) = source {
                let msg = s.to_string();
                // Export and Fatal wrap an error whose message is already in `top`.
                if !top.ends_with(&msg) {
                    eprintln!("  cause: {}", msg);
                }
                source = s.source();
            }
        }
        std::process::exit(e.exit_code());
    }
}
