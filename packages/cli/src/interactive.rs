//! Interactive report prompt.
//!
//! Repeatedly asks for a zip code (or `quit`) and a date range, printing the
//! report for each valid query. Bad input is reported and the prompt starts
//! over; it never ends the session.

use collision_map_index::{CollisionIndex, ReportQuery};
use dialoguer::Input;

const QUIT: &str = "quit";

fn prompt(text: &str) -> Result<String, dialoguer::Error> {
    Input::<String>::new()
        .with_prompt(text)
        .allow_empty(true)
        .interact_text()
}

/// Runs the prompt loop against a loaded index until the user types `quit`.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read from.
pub fn run(index: &CollisionIndex) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let zip = prompt("Enter a zipcode or 'quit' to exit")?;
        let zip = zip.trim();
        if zip.eq_ignore_ascii_case(QUIT) {
            break;
        }

        // Reject a bad zip before asking for dates.
        if let Err(e) = ReportQuery::check_zip(zip) {
            log::debug!("{e}");
            eprintln!("Invalid Zip Code");
            continue;
        }

        let date_begin = prompt("Enter a start date (MM/DD/YYYY)")?;
        let date_end = prompt("Enter an end date (MM/DD/YYYY)")?;

        match ReportQuery::parse(zip, &date_begin, &date_end) {
            Ok(query) => println!("{}\n", index.report_for(&query)),
            Err(e) => {
                log::debug!("{e}");
                eprintln!("Invalid Date Format. Try Again.");
            }
        }
    }

    Ok(())
}
