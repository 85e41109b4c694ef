//! Loading flag bookkeeping shared by the stores

use referly_core::StateCell;

/// State that tracks an in-flight request and its last error
pub(crate) trait Loadable {
    fn set_loading(&mut self, loading: bool);
    fn set_error(&mut self, error: Option<String>);
}

/// Marks a cell as loading for as long as the guard lives.
///
/// Creation sets `loading = true` and clears the error; drop sets
/// `loading = false` whether the action finished, failed, or was cancelled.
pub(crate) struct LoadingGuard<'a, S: Loadable + Clone + Send + Sync + 'static> {
    cell: &'a StateCell<S>,
}

impl<'a, S: Loadable + Clone + Send + Sync + 'static> LoadingGuard<'a, S> {
    pub(crate) fn begin(cell: &'a StateCell<S>) -> Self {
        cell.update(|state| {
            state.set_loading(true);
            state.set_error(None);
        });
        Self { cell }
    }
}

impl<S: Loadable + Clone + Send + Sync + 'static> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.cell.update(|state| state.set_loading(false));
    }
}
