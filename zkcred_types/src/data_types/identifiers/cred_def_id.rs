impl_zkcred_object_identifier!(CredentialDefinitionId, LEGACY_CRED_DEF_IDENTIFIER);
