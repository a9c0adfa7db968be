//! Host extraction from resolver output.
//!
//! Only one record convention is understood: a line whose first
//! whitespace-delimited token is the service name carries the backend host in
//! a fixed later field (field 4 of a `dig` answer line:
//! `name ttl class type value`). A format change upstream makes this pick the
//! wrong token instead of failing.

/// Lazily yield the host field of every record line for `service`.
///
/// A single trailing `.` on either name is ignored so fully-qualified answer
/// names match the configured service. Matching lines that are too short to
/// carry `host_field` are skipped.
pub fn extract_hosts<'a, I>(
    lines: I,
    service: &'a str,
    host_field: usize,
) -> impl Iterator<Item = &'a str> + 'a
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: 'a,
{
    let service = strip_root(service);
    lines.into_iter().filter_map(move |line| {
        let mut fields = line.split_whitespace();
        let name = fields.next()?;
        if strip_root(name) != service {
            return None;
        }
        // `fields` already consumed the name (field 0)
        host_field.checked_sub(1).map_or(Some(name), |n| fields.nth(n))
    })
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}
