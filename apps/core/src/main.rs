fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match quickcuts_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quickcuts-core] {error}");
            eprintln!(
                "[quickcuts-core] usage: quickcuts-core [-r|--reset] [--log] [--config <path>] \
                 [--list | --serve | --complete <text> | --run <text>]"
            );
            std::process::exit(2);
        }
    };

    if let Err(error) = quickcuts_core::runtime::run_with_options(options) {
        eprintln!("[quickcuts-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
