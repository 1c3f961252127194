// No dedicated legacy grammar for revocation registry ids; the DID form is
// accepted alongside URIs.
impl_zkcred_object_identifier!(RevocationRegistryDefinitionId, LEGACY_DID_IDENTIFIER);
