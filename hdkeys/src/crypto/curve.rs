//! secp256k1 point and scalar arithmetic
//!
//! Keys travel through this module as fixed-size byte arrays: 32-byte
//! big-endian scalars and 33-byte compressed points. Range and encoding
//! failures from the curve library are mapped onto the derivation errors so
//! callers can decide whether to retry with the next index.

use std::sync::OnceLock;

use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};

use crate::error::{Error, Result};

/// Byte count of a compressed public key
pub const PUBLIC_KEY_COMPRESSED_LENGTH: usize = 33;

/// Order of the secp256k1 base point, big-endian
pub const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

fn context() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// Multiply the base point by `scalar` and return the compressed result.
///
/// Fails with [`Error::InvalidPrivateKey`] if the scalar is zero or not below
/// the curve order.
pub fn scalar_base_multiply(scalar: &[u8; 32]) -> Result<[u8; 33]> {
    let secret_key = SecretKey::from_slice(scalar).map_err(|_| Error::InvalidPrivateKey)?;
    Ok(PublicKey::from_secret_key(context(), &secret_key).serialize())
}

/// Recover the affine `(x, y)` coordinates of a compressed point.
pub fn expand(compressed: &[u8; 33]) -> Result<([u8; 32], [u8; 32])> {
    let public_key = PublicKey::from_slice(compressed).map_err(|_| Error::InvalidPublicKey)?;
    let uncompressed = public_key.serialize_uncompressed();

    let mut x = [0u8; 32];
    let mut y = [0u8; 32];
    x.copy_from_slice(&uncompressed[1..33]);
    y.copy_from_slice(&uncompressed[33..65]);
    Ok((x, y))
}

/// Add two compressed points.
pub fn add_points(a: &[u8; 33], b: &[u8; 33]) -> Result<[u8; 33]> {
    let a = PublicKey::from_slice(a).map_err(|_| Error::InvalidPublicKey)?;
    let b = PublicKey::from_slice(b).map_err(|_| Error::InvalidPublicKey)?;
    let sum = a.combine(&b).map_err(|_| Error::InvalidPublicKey)?;
    Ok(sum.serialize())
}

/// Compute `(tweak + scalar) mod n`.
///
/// `scalar` must already be a valid private key; `tweak` must be below the
/// curve order. A zero sum is rejected.
pub fn add_scalars_mod_n(tweak: &[u8; 32], scalar: &[u8; 32]) -> Result<[u8; 32]> {
    let secret_key = SecretKey::from_slice(scalar).map_err(|_| Error::InvalidPrivateKey)?;
    let tweak = Scalar::from_be_bytes(*tweak).map_err(|_| Error::InvalidPrivateKey)?;
    let sum = secret_key
        .add_tweak(&tweak)
        .map_err(|_| Error::InvalidPrivateKey)?;
    Ok(sum.secret_bytes())
}

/// Check `0 < scalar < n`.
pub fn validate_private_scalar(scalar: &[u8; 32]) -> Result<()> {
    if scalar.iter().all(|&b| b == 0) || scalar[..] >= CURVE_ORDER[..] {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(())
}

/// Reject a point with a zero x or y coordinate.
///
/// This is only an approximation of a point-at-infinity test.
pub fn validate_child_public_key(compressed: &[u8; 33]) -> Result<()> {
    let (x, y) = expand(compressed)?;
    if x.iter().all(|&b| b == 0) || y.iter().all(|&b| b == 0) {
        return Err(Error::InvalidPublicKey);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_Y: &str = "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
    const TWO_G: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    fn scalar(value: u8) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[31] = value;
        bytes
    }

    fn point(hex_str: &str) -> [u8; 33] {
        let mut bytes = [0u8; 33];
        hex::decode_to_slice(hex_str, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_scalar_base_multiply_generator() {
        assert_eq!(hex::encode(scalar_base_multiply(&scalar(1)).unwrap()), G);
        assert_eq!(hex::encode(scalar_base_multiply(&scalar(2)).unwrap()), TWO_G);
    }

    #[test]
    fn test_scalar_base_multiply_rejects_zero_and_order() {
        assert!(matches!(scalar_base_multiply(&[0u8; 32]), Err(Error::InvalidPrivateKey)));
        assert!(matches!(scalar_base_multiply(&CURVE_ORDER), Err(Error::InvalidPrivateKey)));
    }

    #[test]
    fn test_expand_generator() {
        let (x, y) = expand(&point(G)).unwrap();
        assert_eq!(hex::encode(x), &G[2..]);
        assert_eq!(hex::encode(y), G_Y);
    }

    #[test]
    fn test_expand_respects_parity_header() {
        let mut odd = point(G);
        odd[0] = 0x03;
        let (_, y_even) = expand(&point(G)).unwrap();
        let (_, y_odd) = expand(&odd).unwrap();
        assert_eq!(y_even[31] & 1, 0);
        assert_eq!(y_odd[31] & 1, 1);
    }

    #[test]
    fn test_add_points() {
        let g = point(G);
        assert_eq!(hex::encode(add_points(&g, &g).unwrap()), TWO_G);
    }

    #[test]
    fn test_add_points_to_infinity_fails() {
        let g = point(G);
        let mut neg_g = g;
        neg_g[0] = 0x03;
        assert!(matches!(add_points(&g, &neg_g), Err(Error::InvalidPublicKey)));
    }

    #[test]
    fn test_add_scalars_mod_n() {
        assert_eq!(add_scalars_mod_n(&scalar(1), &scalar(2)).unwrap(), scalar(3));

        // (n - 1) + 2 wraps to 1
        let mut n_minus_one = CURVE_ORDER;
        n_minus_one[31] -= 1;
        assert_eq!(add_scalars_mod_n(&scalar(2), &n_minus_one).unwrap(), scalar(1));

        // (n - 1) + 1 is zero
        assert!(matches!(
            add_scalars_mod_n(&scalar(1), &n_minus_one),
            Err(Error::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_add_scalars_rejects_tweak_above_order() {
        assert!(matches!(
            add_scalars_mod_n(&CURVE_ORDER, &scalar(1)),
            Err(Error::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_validate_private_scalar() {
        assert!(validate_private_scalar(&scalar(1)).is_ok());
        assert!(validate_private_scalar(&[0u8; 32]).is_err());
        assert!(validate_private_scalar(&CURVE_ORDER).is_err());
        assert!(validate_private_scalar(&[0xff; 32]).is_err());

        let mut n_minus_one = CURVE_ORDER;
        n_minus_one[31] -= 1;
        assert!(validate_private_scalar(&n_minus_one).is_ok());
    }

    #[test]
    fn test_validate_child_public_key() {
        assert!(validate_child_public_key(&point(G)).is_ok());
    }
}
