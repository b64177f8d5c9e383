pub mod disasm;
pub mod info;
pub mod lift;
pub mod module_loader;


/// Report `msg` and exit with status 1.
pub fn fail(msg: &str) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(1);
}
