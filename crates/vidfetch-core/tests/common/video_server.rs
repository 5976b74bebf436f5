//! Minimal HTTP/1.1 server standing in for a video host in integration tests.
//!
//! Serves `/watch?v=<id>` as an HTML page embedding a player response whose
//! single muxed format points back at `/media/<id>` on the same server. What
//! `/media/<id>` does is chosen per video.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Media {
    /// 200 with the whole body.
    Body(Vec<u8>),
    /// 200 headers and a first chunk, then nothing until the client gives up.
    Stall,
    /// Bare status response with a short error page.
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub length_seconds: u64,
    pub view_count: Option<u64>,
    pub media: Media,
}

impl Video {
    pub fn new(id: &str, title: &str, media: Media) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            length_seconds: 125,
            view_count: Some(2000),
            media,
        }
    }
}

/// Starts a server in a background thread. Returns the origin
/// (e.g. "http://127.0.0.1:12345"). The server runs until the process exits.
pub fn start(videos: Vec<Video>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let origin = format!("http://127.0.0.1:{}", port);
    let videos: Arc<HashMap<String, Video>> =
        Arc::new(videos.into_iter().map(|v| (v.id.clone(), v)).collect());
    let base = origin.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let videos = Arc::clone(&videos);
            let base = base.clone();
            thread::spawn(move || handle(stream, &videos, &base));
        }
    });
    origin
}

fn handle(mut stream: TcpStream, videos: &HashMap<String, Video>, base: &str) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    if let Some(id) = target.strip_prefix("/watch?v=") {
        match videos.get(id) {
            Some(video) => {
                let page = watch_page(video, base);
                respond(&mut stream, "200 OK", "text/html; charset=utf-8", page.as_bytes());
            }
            None => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
        }
        return;
    }
    if let Some(id) = target.strip_prefix("/media/") {
        match videos.get(id).map(|v| &v.media) {
            Some(Media::Body(body)) => respond(&mut stream, "200 OK", "video/mp4", body),
            Some(Media::Stall) => stall(&mut stream),
            Some(Media::Status(code)) => {
                let status = format!("{} Error", code);
                respond(&mut stream, &status, "text/html", b"<html>denied</html>");
            }
            None => respond(&mut stream, "404 Not Found", "text/plain", b"not found"),
        }
        return;
    }
    respond(&mut stream, "404 Not Found", "text/plain", b"not found");
}

fn respond(stream: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn stall(stream: &mut TcpStream) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: 1048576\r\nConnection: close\r\n\r\n";
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&[0u8; 1024]);
    let _ = stream.flush();
    thread::sleep(Duration::from_secs(10));
}

fn watch_page(video: &Video, base: &str) -> String {
    let mut details = serde_json::json!({
        "videoId": video.id,
        "title": video.title,
        "lengthSeconds": video.length_seconds.to_string(),
    });
    if let Some(views) = video.view_count {
        details["viewCount"] = serde_json::Value::String(views.to_string());
    }
    let player_response = serde_json::json!({
        "playabilityStatus": { "status": "OK" },
        "videoDetails": details,
        "streamingData": {
            "formats": [{
                "itag": 18,
                "url": format!("{}/media/{}", base, video.id),
                "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
                "height": 360,
                "bitrate": 500000,
                "audioQuality": "AUDIO_QUALITY_LOW"
            }]
        }
    });
    format!(
        "<!DOCTYPE html><html><head><title>{} - Video</title></head><body>\
         <script>var ytInitialPlayerResponse = {};var meta = {{}};</script>\
         </body></html>",
        video.title, player_response
    )
}
