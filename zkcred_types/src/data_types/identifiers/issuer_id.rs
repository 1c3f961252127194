impl_zkcred_object_identifier!(IssuerId, LEGACY_DID_IDENTIFIER);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuer_id_uri_is_valid() {
        assert!(IssuerId::new("did:sov:NcYxiDXkpYi6ov5FcYDi1e").is_ok());
    }

    #[test]
    fn issuer_id_legacy_did_is_valid() {
        assert!(IssuerId::new("NcYxiDXkpYi6ov5FcYDi1e").is_ok());
    }

    #[test]
    fn issuer_id_arbitrary_string_is_invalid() {
        assert!(IssuerId::new("bob").is_err());
    }
}
