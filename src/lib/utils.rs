/// Creates a [Marking](crate::net::marking::Marking) from a list of
/// `place => tokens` entries. Zero counts are dropped, duplicate places
/// accumulate.
#[macro_export]
macro_rules! marking {
    ($($place:expr => $count:expr),* $(,)?) => (
        [$(($place, $count)),*]
            .into_iter()
            .collect::<$crate::net::marking::Marking<_>>()
    );
}
