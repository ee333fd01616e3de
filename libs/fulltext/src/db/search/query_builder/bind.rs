use super::BindValue;

/// Queue a value for binding and return its MySQL placeholder.
pub(super) fn push(bind_params: &mut Vec<BindValue>, value: BindValue) -> &'static str {
    bind_params.push(value);
    "?"
}

/// Queue every value in order and return the comma-separated placeholders.
pub(super) fn push_list<'a, I>(bind_params: &mut Vec<BindValue>, values: I) -> String
where
    I: IntoIterator<Item = &'a BindValue>,
{
    values
        .into_iter()
        .map(|value| push(bind_params, value.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}
