fn main() {
    if let Err(e) = rheac_drv::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
