fn main() {
    if let Err(e) = mex_drv::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
