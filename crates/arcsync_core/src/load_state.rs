/// Load progress of the archive collection.
///
/// `Loaded` means the active strategy's in-flight requests have all
/// completed; it does not imply they all succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
}
