use console::style;
use std::{
    io::{self, Write},
    path::Path,
};

pub fn welcome() {
    println!("Welcome to {}\n", style("grab-box").bright().green());
}

pub fn downloading_box(url: &str) {
    println!(
        "[{}] Downloading box: {}",
        style("NOTICE").bright().green(),
        style(url).bright().green()
    );
}

/// One progress dot, flushed so it shows up before the line ends
///
/// # Errors
///
/// - Stdout is closed
pub fn progress_dot() -> io::Result<()> {
    print!(".");
    io::stdout().flush()
}

pub fn download_complete() {
    println!("{}\n", style("Complete!").bright().green());
}

pub fn unknown_size(url: &str) {
    println!(
        "[{}] Server did not send a size for {}, no progress will be shown",
        style("CAUTION").bright().yellow(),
        style(url).bright().green()
    );
}

pub fn unarchiving() {
    println!(
        "\n[{}] Unarchiving container...",
        style("NOTICE").bright().green()
    );
}

pub fn container_created(container_dir: &Path) {
    println!(
        "[{}] Container created in: {}",
        style("DONE").bright().green(),
        style(container_dir.display()).bright().green()
    );
}

pub fn overwriting_container(container_dir: &Path) {
    println!(
        "[{}] Unpacking over the existing container in {}",
        style("CAUTION").bright().yellow(),
        style(container_dir.display()).bright().green()
    );
}

pub fn config_written(config_path: &Path) {
    println!(
        "[{}] Wrote container configuration to {}",
        style("DONE").bright().green(),
        style(config_path.display()).bright().green()
    );
}

pub fn finished(start_command: &str) {
    println!(
        "\n\nFinished! You can execute the following command to start the container:\n\n\t{}",
        style(start_command).bright().yellow()
    );
}
