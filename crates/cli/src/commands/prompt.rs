//! `thinki prompt`: Show the prompt a request would produce.

use std::path::Path;

use thinki_core::Subject;

pub async fn run(subject: Subject, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let request = super::read_request(file)?;
    let prompt = thinki_core::render_prompt(subject, &request)?;

    let mode = if request.custom_template().is_some() {
        "custom template"
    } else {
        "default"
    };
    eprintln!("# {subject} prompt ({mode}), {} chars", prompt.len());
    println!("{prompt}");

    Ok(())
}
