use crate::webhook::FormFields;

/// Concatenate form fields as `key value value key value ...` with keys sorted byte-wise.
///
/// There are no separators, so distinct inputs can produce the same string
/// (`{"ab": ["c"]}` and `{"a": ["bc"]}`); the signature scheme accepts that.
pub fn canonical_form(fields: &FormFields) -> String {
    let mut keys = fields.keys().collect::<Vec<_>>();
    keys.sort_unstable();

    let mut out = String::new();
    for key in keys {
        out.push_str(key);
        for value in fields.get_all(key) {
            out.push_str(value);
        }
    }
    out
}
