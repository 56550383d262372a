/// Shared utility functions

/// Safely truncate a string at a UTF-8 boundary
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if max_bytes >= s.len() { return s; }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Paper id as used in file names (`P19.1001` -> `P19_1001`)
pub fn clean_paper_id(paper_id: &str) -> String {
    paper_id.replace('.', "_")
}

/// Venue name as used in directory names
pub fn clean_venue_name(venue_name: &str) -> String {
    venue_name.replace('*', "").replace(['/', ' '], "_")
}
