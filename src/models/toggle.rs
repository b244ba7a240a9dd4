
/// A live toggle control with the state derived from it during one discovery
/// pass. Recomputed on every query; never kept across passes because the host
/// page may re-render the element at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleHandle<E> {
    pub element: E,
    pub label: String,
    pub checked: bool,
}

impl<E> ToggleHandle<E> {
    pub fn new(element: E, label: String, checked: bool) -> Self {
        Self {
            element,
            label,
            checked,
        }
    }
}
