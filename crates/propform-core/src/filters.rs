//! Filter selection policy and delimited list helpers

/// Split a delimited list, dropping empty segments
#[must_use]
pub fn split_list(joined: &str, delimiter: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined
        .split(delimiter)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a list with the delimiter
#[must_use]
pub fn join_list(items: &[String], delimiter: &str) -> String {
    items.join(delimiter)
}

/// Apply a filter-change event
///
/// The sentinel and concrete filters are mutually exclusive. Adding the
/// sentinel to an active concrete selection collapses it to the sentinel
/// alone; adding a concrete filter while the sentinel is active drops the
/// sentinel. Duplicates and empty ids are removed, order is preserved.
#[must_use]
pub fn apply_filter_change(previous: &[String], incoming: &[String], none: &str) -> Vec<String> {
    let mut next: Vec<String> = Vec::with_capacity(incoming.len());
    for id in incoming {
        if !id.is_empty() && !next.contains(id) {
            next.push(id.clone());
        }
    }

    let none_is_selected = next.iter().any(|f| f == none);
    if !none_is_selected || next.len() == 1 {
        return next;
    }

    let none_was_selected = previous.iter().any(|f| f == none);
    if none_was_selected {
        next.retain(|f| f != none);
        next
    } else {
        vec![none.to_string()]
    }
}

/// Whether a selection respects sentinel exclusivity
#[must_use]
pub fn is_exclusive(selection: &[String], none: &str) -> bool {
    !selection.iter().any(|f| f == none) || selection.len() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn split_and_join() {
        assert!(split_list("", ",").is_empty());
        assert_eq!(split_list("a,,b", ","), list(&["a", "b"]));
        assert_eq!(join_list(&list(&["a", "b"]), ","), "a,b");
        assert_eq!(split_list("a|b", "|"), list(&["a", "b"]));
    }

    #[test]
    fn none_replaces_concrete_filters() {
        let previous = list(&["EMAIL", "PHONE"]);
        let incoming = list(&["EMAIL", "PHONE", "NONE"]);
        assert_eq!(apply_filter_change(&previous, &incoming, "NONE"), list(&["NONE"]));
    }

    #[test]
    fn concrete_filter_drops_none() {
        let previous = list(&["NONE"]);
        let incoming = list(&["NONE", "EMAIL"]);
        assert_eq!(apply_filter_change(&previous, &incoming, "NONE"), list(&["EMAIL"]));
    }

    #[test]
    fn none_alone_is_kept() {
        assert_eq!(apply_filter_change(&[], &list(&["NONE"]), "NONE"), list(&["NONE"]));
    }

    #[test]
    fn plain_selection_passes_through() {
        let incoming = list(&["EMAIL", "EMAIL", "", "PHONE"]);
        assert_eq!(
            apply_filter_change(&[], &incoming, "NONE"),
            list(&["EMAIL", "PHONE"])
        );
    }

    #[test]
    fn exclusivity_check() {
        assert!(is_exclusive(&list(&["NONE"]), "NONE"));
        assert!(is_exclusive(&list(&["EMAIL", "PHONE"]), "NONE"));
        assert!(!is_exclusive(&list(&["NONE", "EMAIL"]), "NONE"));
    }
}
