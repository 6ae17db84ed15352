/// Maximum bytes per Discord message (2000 chars is the limit; we use 1950 for safety).
const CHUNK_MAX: usize = 1950;

/// Largest index `<= max` that falls on a char boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Split `text` into chunks of at most [`CHUNK_MAX`] bytes, preferring
/// splits on newline/space boundaries to avoid cutting words mid-way.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > CHUNK_MAX {
        let window = &remaining[..floor_char_boundary(remaining, CHUNK_MAX)];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&i| i > 0)
            .unwrap_or(window.len());

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}

/// Send `chunks` to `channel_id` as plain messages, in order.
pub async fn say_all(
    http: &serenity::http::Http,
    channel_id: serenity::model::id::ChannelId,
    chunks: &[String],
) -> Result<(), serenity::Error> {
    for chunk in chunks {
        channel_id.say(http, chunk).await?;
    }
    Ok(())
}
