/// Environment variable consulted when no seed is passed on the command line.
pub const SEED_ENV: &str = "GAT_LINK_SEED";

/// Resolve seed from CLI, then env (`GAT_LINK_SEED`); `None` leaves the backend unseeded.
pub fn resolve_seed(cli_seed: Option<u64>) -> Option<u64> {
    if cli_seed.is_some() {
        return cli_seed;
    }
    std::env::var(SEED_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_seed_wins() {
        assert_eq!(resolve_seed(Some(7)), Some(7));
    }
}
