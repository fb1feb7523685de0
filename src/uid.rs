/// Grafana rejects rule uids longer than this.
pub const MAX_UID_LEN: usize = 40;

/// Derive a Grafana rule uid from an alert name.
///
/// Lowercases, maps anything outside `[a-z0-9_-]` to `-`, collapses dash
/// runs, truncates to [`MAX_UID_LEN`] and drops trailing dashes. The result
/// is already in the reduced alphabet, so applying it twice is a no-op.
pub fn generate_uid(name: &str) -> String {
    let mut uid = String::with_capacity(name.len().min(MAX_UID_LEN * 2));
    for c in name.to_lowercase().chars() {
        let c = if is_uid_char(c) { c } else { '-' };
        if c == '-' && uid.ends_with('-') {
            continue;
        }
        uid.push(c);
    }
    // only ASCII remains, so byte truncation is char-safe
    uid.truncate(MAX_UID_LEN);
    let trimmed = uid.trim_end_matches('-').len();
    uid.truncate(trimmed);
    uid
}

pub fn is_uid_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '-')
}

/// True if `uid` could have been produced by [`generate_uid`].
pub fn is_valid_uid(uid: &str) -> bool {
    uid.len() <= MAX_UID_LEN && uid.chars().all(is_uid_char)
}
