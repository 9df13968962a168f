//! Tracking-source parsing.
//!
//! Influenced orders carry a source of the form `trk_<influencer_id>_<post_id>`
//! (e.g., `trk_inf_001_post_002`). Organic orders carry `organic`.

/// Prefix marking an influenced-order tracking link.
pub const TRACKING_PREFIX: &str = "trk_";

/// Marker where the post id starts inside a tracking link.
pub const POST_MARKER: &str = "post_";

/// Extract the post id from a tracking source.
///
/// Returns the suffix starting at the first `post_` when the source starts
/// with `trk_` (ASCII case-insensitive). Anything else, including a tracking
/// link without a post marker, yields `None`.
pub fn post_id_from_source(source: &str) -> Option<&str> {
    let has_prefix = source
        .get(..TRACKING_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(TRACKING_PREFIX));
    if !has_prefix {
        return None;
    }
    source.find(POST_MARKER).map(|at| &source[at..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_post_suffix() {
        assert_eq!(post_id_from_source("trk_inf_001_post_002"), Some("post_002"));
        assert_eq!(post_id_from_source("TRK_inf_9_post_77"), Some("post_77"));
    }

    #[test]
    fn non_tracking_sources_are_none() {
        assert_eq!(post_id_from_source("organic"), None);
        assert_eq!(post_id_from_source(""), None);
        assert_eq!(post_id_from_source("trk"), None);
        assert_eq!(post_id_from_source("ref_post_001"), None);
    }

    #[test]
    fn tracking_link_without_post_is_none() {
        assert_eq!(post_id_from_source("trk_inf_001"), None);
    }
}
