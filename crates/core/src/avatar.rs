/// Fingerprint avatar image bytes for the `image_hash` field of a roster
/// record. The fingerprint is an opaque lowercase hex string; an empty
/// string is reserved to mean "no change" on update.
pub fn fingerprint(image: &[u8]) -> String {
    blake3::hash(image).to_hex().to_string()
}
