//! `vidfetch check <url>` – structural URL validation.

use vidfetch_core::url_model;

pub fn run_check(url: &str) -> bool {
    match url_model::extract_video_id(url) {
        Some(id) => {
            println!("valid (video id {id})");
            true
        }
        None => {
            println!("invalid");
            false
        }
    }
}
