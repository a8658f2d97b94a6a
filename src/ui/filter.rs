use std::borrow::Cow;

use crate::models::UserRecord;

/// Case-insensitive substring match of the trimmed query against pk,
/// username and email. An empty query hands back the list untouched.
pub fn filter_users<'a>(list: &'a [UserRecord], query: &str) -> Cow<'a, [UserRecord]> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Cow::Borrowed(list);
    }
    Cow::Owned(
        list.iter()
            .filter(|u| {
                [&u.pk, &u.username, &u.email]
                    .iter()
                    .any(|v| v.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect(),
    )
}
