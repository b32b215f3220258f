//! Address family policy.
//!
//! One decision function, [`admit`], decides whether an address is
//! accepted for a lookup and in which form. It is driven by a closed
//! [`FamilyFilter`] plus the resolver's IPv4-mapping option.
//!
//! | address | `Inet`              | `Inet6`  | `AnyPreferMapped`   |
//! |---------|---------------------|----------|---------------------|
//! | IPv4    | v4, or mapped v6 ¹  | rejected | v4, or mapped v6 ¹  |
//! | IPv6    | rejected            | v6       | v6                  |
//!
//! ¹ mapped when [`ResolverOptions::map_ipv4_to_ipv6`] is set.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::config::ResolverOptions;
use crate::error::{Result, WireError};

/// Wire value of the IPv4 address family (Linux `AF_INET`).
pub const AF_INET: i32 = 2;

/// Wire value of the IPv6 address family (Linux `AF_INET6`).
pub const AF_INET6: i32 = 10;

/// Width of an IPv4 address block.
pub const INADDRSZ: usize = 4;

/// Width of an IPv6 address block.
pub const IN6ADDRSZ: usize = 16;

/// Address family of a host record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4, 4-byte blocks.
    Inet,
    /// IPv6, 16-byte blocks.
    Inet6,
}

impl AddressFamily {
    /// Block width in bytes.
    #[inline]
    pub fn width(self) -> usize {
        match self {
            AddressFamily::Inet => INADDRSZ,
            AddressFamily::Inet6 => IN6ADDRSZ,
        }
    }

    /// Wire value.
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            AddressFamily::Inet => AF_INET,
            AddressFamily::Inet6 => AF_INET6,
        }
    }

    /// Parse a wire value.
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            AF_INET => Ok(AddressFamily::Inet),
            AF_INET6 => Ok(AddressFamily::Inet6),
            other => Err(WireError::Malformed(format!(
                "unknown address family {}",
                other
            ))),
        }
    }

    /// Family of an address.
    #[inline]
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Inet,
            IpAddr::V6(_) => AddressFamily::Inet6,
        }
    }
}

/// Which addresses a lookup wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyFilter {
    /// IPv4 only (mapped to IPv6 if the resolver asks for it).
    Inet,
    /// IPv6 only.
    Inet6,
    /// Either family; IPv4 is mapped when the resolver asks for it.
    AnyPreferMapped,
}

impl FamilyFilter {
    /// Whether native IPv6 addresses are accepted.
    #[inline]
    pub fn allows_ipv6(self) -> bool {
        !matches!(self, FamilyFilter::Inet)
    }

    /// Widest block this filter can produce.
    pub fn max_width(self, options: &ResolverOptions) -> usize {
        if self.allows_ipv6() || options.map_ipv4_to_ipv6 {
            IN6ADDRSZ
        } else {
            INADDRSZ
        }
    }
}

/// Decide whether `addr` is accepted under `filter`, and in which form.
pub fn admit(addr: IpAddr, filter: FamilyFilter, options: &ResolverOptions) -> Option<IpAddr> {
    match addr {
        IpAddr::V4(_) if filter == FamilyFilter::Inet6 => None,
        IpAddr::V4(v4) if options.map_ipv4_to_ipv6 => Some(IpAddr::V6(v4.to_ipv6_mapped())),
        IpAddr::V4(_) => Some(addr),
        IpAddr::V6(_) if filter.allows_ipv6() => Some(addr),
        IpAddr::V6(_) => None,
    }
}

/// Parse a textual directory value and run it through [`admit`].
///
/// Dotted-quad IPv4 is tried first, then IPv6 when the filter allows it.
pub fn classify(value: &str, filter: FamilyFilter, options: &ResolverOptions) -> Option<IpAddr> {
    if let Ok(v4) = value.parse::<Ipv4Addr>() {
        return admit(IpAddr::V4(v4), filter, options);
    }
    if !filter.allows_ipv6() {
        return None;
    }
    value.parse::<Ipv6Addr>().ok().map(IpAddr::V6)
}

/// Build an address from a raw block of `family` width.
pub fn from_block(family: AddressFamily, block: &[u8]) -> Result<IpAddr> {
    match family {
        AddressFamily::Inet => <[u8; INADDRSZ]>::try_from(block)
            .map(|b| IpAddr::V4(Ipv4Addr::from(b)))
            .map_err(|_| width_mismatch(family, block.len())),
        AddressFamily::Inet6 => <[u8; IN6ADDRSZ]>::try_from(block)
            .map(|b| IpAddr::V6(Ipv6Addr::from(b)))
            .map_err(|_| width_mismatch(family, block.len())),
    }
}

/// Raw octets of an address.
pub fn octets(addr: &IpAddr) -> ([u8; IN6ADDRSZ], usize) {
    let mut raw = [0u8; IN6ADDRSZ];
    match addr {
        IpAddr::V4(v4) => {
            raw[..INADDRSZ].copy_from_slice(&v4.octets());
            (raw, INADDRSZ)
        }
        IpAddr::V6(v6) => (v6.octets(), IN6ADDRSZ),
    }
}

fn width_mismatch(family: AddressFamily, width: usize) -> WireError {
    WireError::Malformed(format!(
        "address width {} does not match family {:?}",
        width, family
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: ResolverOptions = ResolverOptions {
        map_ipv4_to_ipv6: false,
    };
    const MAPPED: ResolverOptions = ResolverOptions {
        map_ipv4_to_ipv6: true,
    };

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_family_wire_values() {
        assert_eq!(AddressFamily::from_i32(2).unwrap(), AddressFamily::Inet);
        assert_eq!(AddressFamily::from_i32(10).unwrap(), AddressFamily::Inet6);
        assert!(AddressFamily::from_i32(99).is_err());
        assert_eq!(AddressFamily::Inet6.width(), 16);
    }

    #[test]
    fn test_inet_filter() {
        assert_eq!(
            classify("10.0.0.1", FamilyFilter::Inet, &PLAIN),
            Some(ip("10.0.0.1"))
        );
        assert_eq!(classify("::1", FamilyFilter::Inet, &PLAIN), None);
        assert_eq!(
            classify("10.0.0.1", FamilyFilter::Inet, &MAPPED),
            Some(ip("::ffff:10.0.0.1"))
        );
    }

    #[test]
    fn test_inet6_filter_rejects_ipv4_text() {
        assert_eq!(classify("10.0.0.1", FamilyFilter::Inet6, &MAPPED), None);
        assert_eq!(
            classify("fe80::1", FamilyFilter::Inet6, &PLAIN),
            Some(ip("fe80::1"))
        );
    }

    #[test]
    fn test_any_prefer_mapped() {
        assert_eq!(
            classify("10.0.0.1", FamilyFilter::AnyPreferMapped, &MAPPED),
            Some(ip("::ffff:10.0.0.1"))
        );
        assert_eq!(
            classify("10.0.0.1", FamilyFilter::AnyPreferMapped, &PLAIN),
            Some(ip("10.0.0.1"))
        );
        assert_eq!(
            classify("::1", FamilyFilter::AnyPreferMapped, &PLAIN),
            Some(ip("::1"))
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        for value in ["not-an-ip", "", "10.0.0", "10.0.0.256", "1::2::3"] {
            assert_eq!(classify(value, FamilyFilter::AnyPreferMapped, &PLAIN), None);
        }
    }

    #[test]
    fn test_max_width() {
        assert_eq!(FamilyFilter::Inet.max_width(&PLAIN), 4);
        assert_eq!(FamilyFilter::Inet.max_width(&MAPPED), 16);
        assert_eq!(FamilyFilter::Inet6.max_width(&PLAIN), 16);
        assert_eq!(FamilyFilter::AnyPreferMapped.max_width(&PLAIN), 16);
    }

    #[test]
    fn test_from_block() {
        assert_eq!(
            from_block(AddressFamily::Inet, &[10, 0, 0, 1]).unwrap(),
            ip("10.0.0.1")
        );
        assert!(from_block(AddressFamily::Inet6, &[10, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_octets() {
        let (raw, len) = octets(&ip("10.0.0.2"));
        assert_eq!(&raw[..len], &[10, 0, 0, 2]);
        let (raw, len) = octets(&ip("::1"));
        assert_eq!(len, 16);
        assert_eq!(raw[15], 1);
    }
}
