impl_zkcred_object_identifier!(SchemaId, LEGACY_SCHEMA_IDENTIFIER);
