//! Input validation helpers.

/// Reduce a client-submitted filename to `[A-Za-z0-9._-]`.
///
/// Every other character becomes `_`. The result is safe to embed in a
/// storage key; it is never used as-is for a filesystem path without the
/// store's own traversal checks. An empty or all-replaced input still yields
/// a usable name.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_filename("foto.png"), "foto.png");
        assert_eq!(sanitize_filename("mi-casa_01.JPG"), "mi-casa_01.JPG");
    }

    #[test]
    fn test_sanitize_replaces_everything_else() {
        assert_eq!(sanitize_filename("mi casa.png"), "mi_casa.png");
        assert_eq!(sanitize_filename("fachada (1).jpg"), "fachada__1_.jpg");
        assert_eq!(sanitize_filename("año/nuevo.png"), "a_o_nuevo.png");
    }

    #[test]
    fn test_sanitize_neutralizes_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn test_sanitize_empty_input() {
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize_filename("foto de casa.png");
        assert_eq!(sanitize_filename(&once), once);
    }
}
