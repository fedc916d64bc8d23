//! Trial-division primality helpers.

/// Largest prime representable in a `u32`.
pub const LARGEST_U32_PRIME: u32 = 4_294_967_291;

/// Whether `n` is prime.
#[must_use]
pub const fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    // `i <= n / i` instead of `i * i <= n` keeps this overflow-free near u32::MAX.
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Smallest prime `>= n`, or `None` if no such prime fits in a `u32`.
#[must_use]
pub const fn next_prime_at_or_after(n: u32) -> Option<u32> {
    if n > LARGEST_U32_PRIME {
        return None;
    }
    let mut candidate = n;
    while !is_prime(candidate) {
        candidate += 1;
    }
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMES_TO_100: [u32; 25] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97,
    ];

    #[test]
    fn test_is_prime_matches_reference() {
        for n in 0..=100 {
            assert_eq!(is_prime(n), PRIMES_TO_100.contains(&n), "n = {n}");
        }
    }

    #[test]
    fn test_next_prime() {
        assert_eq!(next_prime_at_or_after(0), Some(2));
        assert_eq!(next_prime_at_or_after(2), Some(2));
        assert_eq!(next_prime_at_or_after(14), Some(17));
        assert_eq!(next_prime_at_or_after(97), Some(97));
        assert_eq!(next_prime_at_or_after(98), Some(101));
    }

    #[test]
    fn test_top_of_range() {
        assert!(is_prime(LARGEST_U32_PRIME));
        assert!(!is_prime(u32::MAX));
        assert_eq!(
            next_prime_at_or_after(LARGEST_U32_PRIME - 1),
            Some(LARGEST_U32_PRIME)
        );
        assert_eq!(next_prime_at_or_after(LARGEST_U32_PRIME + 1), None);
        assert_eq!(next_prime_at_or_after(u32::MAX), None);
    }
}
