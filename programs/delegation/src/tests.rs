//! Unit tests for the delegation template and authorization predicate
//!
//! These tests exercise the verifier-side logic with fixed keys so every
//! outcome is reproducible.

#[cfg(test)]
mod unit_tests {
    use ed25519_dalek::{Signer, SigningKey};

    use crate::constants::{MAX_ORIGIN_LEN, PROGRAM_DOMAIN};
    use crate::crypto::{hash_with_domain, validate_owner_key, PublicKey, Signature};
    use crate::error::{NoteError, RejectReason, TemplateError, TxError};
    use crate::predicate::{gate_opcodes, AuthorizationPredicate, Verdict};
    use crate::state::{
        derive_address, instantiate, Address, AuthorizationWitness, ContractImage,
        DelegatingTransaction, Origin, OwnerKeySet, Transaction, TxKind, PREDICATE_PROGRAM,
    };

    fn signing_key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn public(key: &SigningKey) -> PublicKey {
        key.verifying_key().into()
    }

    fn image(owners: &[&SigningKey], origin: &str) -> ContractImage {
        let owners = OwnerKeySet::new(owners.iter().map(|k| public(k)).collect());
        instantiate(&owners, &Origin::from(origin)).expect("valid template")
    }

    fn delegation(owner: &SigningKey, ephemeral: &SigningKey, origin: &str, expiry: u64) -> DelegatingTransaction {
        DelegatingTransaction::new(public(owner), public(ephemeral), &Origin::from(origin), expiry)
            .expect("valid origin")
    }

    fn outer_for(image: &ContractImage, amount: u64) -> Transaction {
        let mut tx = Transaction::payment(Address([0x77; 32]), amount, 1_000);
        tx.sender = derive_address(image);
        tx.first_valid = 100;
        tx.last_valid = 1_100;
        tx.network = "testnet".to_string();
        tx
    }

    fn witness(
        owner: &SigningKey,
        ephemeral: &SigningKey,
        delegation: DelegatingTransaction,
        outer: &Transaction,
    ) -> AuthorizationWitness {
        let delegation_signature: Signature = owner.sign(&delegation.canonical_bytes()).into();
        let session_signature: Signature = ephemeral.sign(outer.id().as_bytes()).into();
        AuthorizationWitness {
            delegation,
            delegation_signature,
            session_signature,
        }
    }

    // ==================== Template Tests ====================

    #[test]
    fn test_instantiate_is_deterministic() {
        let o1 = signing_key(1);
        let a = image(&[&o1], "game.example");
        let b = image(&[&o1], "game.example");

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(derive_address(&a), derive_address(&b));
    }

    #[test]
    fn test_address_is_hash_of_image() {
        let o1 = signing_key(1);
        let img = image(&[&o1], "game.example");
        let expected = hash_with_domain(PROGRAM_DOMAIN, &[img.as_bytes()]);
        assert_eq!(img.address().to_bytes(), expected);
    }

    #[test]
    fn test_address_depends_on_origin_and_owners() {
        let o1 = signing_key(1);
        let o2 = signing_key(2);

        let base = image(&[&o1], "game.example").address();
        assert_ne!(base, image(&[&o1], "other.example").address());
        assert_ne!(base, image(&[&o2], "game.example").address());
        assert_ne!(base, image(&[&o1, &o2], "game.example").address());
        // Order of owners is part of the binding
        assert_ne!(
            image(&[&o1, &o2], "game.example").address(),
            image(&[&o2, &o1], "game.example").address()
        );
    }

    #[test]
    fn test_origin_size_limit() {
        let owners = OwnerKeySet::new(vec![public(&signing_key(1))]);

        let at_limit = Origin::new(vec![b'a'; MAX_ORIGIN_LEN]);
        assert!(instantiate(&owners, &at_limit).is_ok());

        let over = Origin::new(vec![b'a'; MAX_ORIGIN_LEN + 1]);
        assert_eq!(
            instantiate(&owners, &over),
            Err(TemplateError::Oversize { field: "origin", len: 65, max: 64 })
        );
    }

    #[test]
    fn test_owner_set_size_limit() {
        let owners = OwnerKeySet::new(vec![
            public(&signing_key(1)),
            public(&signing_key(2)),
            public(&signing_key(3)),
        ]);
        assert_eq!(
            instantiate(&owners, &Origin::from("game.example")),
            Err(TemplateError::Oversize { field: "owners", len: 96, max: 64 })
        );
    }

    #[test]
    fn test_owner_set_must_be_nonempty_and_unique() {
        let origin = Origin::from("game.example");
        assert_eq!(
            instantiate(&OwnerKeySet::default(), &origin),
            Err(TemplateError::EmptyOwnerSet)
        );

        let k = public(&signing_key(1));
        assert_eq!(
            instantiate(&OwnerKeySet::new(vec![k, k]), &origin),
            Err(TemplateError::DuplicateOwner)
        );
    }

    #[test]
    fn test_owner_keys_must_be_valid_points() {
        let origin = Origin::from("game.example");

        assert!(!validate_owner_key(&PublicKey([0u8; 32])));
        assert_eq!(
            instantiate(&OwnerKeySet::new(vec![PublicKey([0u8; 32])]), &origin),
            Err(TemplateError::InvalidOwnerKey)
        );

        // Identity point (y = 1) has small order
        let mut identity = [0u8; 32];
        identity[0] = 1;
        assert!(!validate_owner_key(&PublicKey(identity)));

        assert!(validate_owner_key(&public(&signing_key(9))));
    }

    #[test]
    fn test_image_layout_and_reparse() {
        let o1 = signing_key(1);
        let o2 = signing_key(2);
        let img = image(&[&o1, &o2], "game.example");

        let bytes = img.as_bytes();
        assert!(bytes.starts_with(b"DLGPROG"));
        assert!(bytes.ends_with(PREDICATE_PROGRAM));

        let parsed = ContractImage::from_bytes(bytes).expect("reparse");
        assert_eq!(parsed, img);
        assert_eq!(parsed.origin(), &Origin::from("game.example"));
        assert_eq!(parsed.owners().primary(), Some(&public(&o1)));
    }

    #[test]
    fn test_image_reparse_rejects_tampering() {
        let img = image(&[&signing_key(1)], "game.example");
        let bytes = img.as_bytes();

        assert_eq!(
            ContractImage::from_bytes(&bytes[..bytes.len() - 1]),
            Err(TemplateError::MalformedImage)
        );

        let mut extended = bytes.to_vec();
        extended.push(0);
        assert_eq!(ContractImage::from_bytes(&extended), Err(TemplateError::MalformedImage));

        let mut bad_magic = bytes.to_vec();
        bad_magic[0] ^= 0xFF;
        assert_eq!(ContractImage::from_bytes(&bad_magic), Err(TemplateError::MalformedImage));
    }

    #[test]
    fn test_program_body_matches_gate_table() {
        assert_eq!(gate_opcodes(), PREDICATE_PROGRAM.to_vec());
    }

    // ==================== Transaction Model Tests ====================

    #[test]
    fn test_outer_id_covers_every_field() {
        let img = image(&[&signing_key(1)], "game.example");
        let base = outer_for(&img, 5_000);
        let id = base.id();

        let mut changed = base.clone();
        changed.amount += 1;
        assert_ne!(changed.id(), id);

        let mut changed = base.clone();
        changed.fee += 1;
        assert_ne!(changed.id(), id);

        let mut changed = base.clone();
        changed.last_valid += 1;
        assert_ne!(changed.id(), id);

        let mut changed = base.clone();
        changed.note = b"memo".to_vec();
        assert_ne!(changed.id(), id);

        let mut changed = base.clone();
        changed.network = "mainnet".to_string();
        assert_ne!(changed.id(), id);

        let mut changed = base.clone();
        changed.kind = TxKind::ApplicationCall;
        assert_ne!(changed.id(), id);

        assert_eq!(base.clone().id(), id);
    }

    #[test]
    fn test_variable_fields_are_length_prefixed() {
        // Moving a byte between note and network must change the id
        let mut a = Transaction::payment(Address([1; 32]), 1, 1);
        a.note = b"ab".to_vec();
        a.network = "c".to_string();

        let mut b = a.clone();
        b.note = b"a".to_vec();
        b.network = "bc".to_string();

        assert_ne!(a.canonical_bytes(), b.canonical_bytes());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_outer_transaction_validation() {
        let mut tx = Transaction::payment(Address([1; 32]), 1, 1);
        assert!(tx.validate().is_ok());

        tx.first_valid = 10;
        tx.last_valid = 5;
        assert_eq!(
            tx.validate(),
            Err(TxError::InvalidValidityWindow { first: 10, last: 5 })
        );

        tx.last_valid = 20;
        tx.note = vec![0; 1025];
        assert_eq!(tx.validate(), Err(TxError::NoteTooLong(1025)));

        tx.note.clear();
        tx.kind = TxKind::Delegation;
        assert_eq!(tx.validate(), Err(TxError::DelegationKind));
    }

    #[test]
    fn test_wire_encoding_roundtrip() {
        let img = image(&[&signing_key(1)], "game.example");
        let tx = outer_for(&img, 42);
        let decoded = Transaction::from_wire(&tx.to_wire().unwrap()).unwrap();
        assert_eq!(decoded.id(), tx.id());

        let d = delegation(&signing_key(1), &signing_key(50), "game.example", 4_600);
        let decoded = DelegatingTransaction::from_wire(&d.to_wire().unwrap()).unwrap();
        assert_eq!(decoded.canonical_bytes(), d.canonical_bytes());

        assert!(Transaction::from_wire(&[0xFF, 0x00]).is_err());
    }

    #[test]
    fn test_address_base58_roundtrip() {
        let addr = image(&[&signing_key(1)], "game.example").address();
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
        assert!("not-base58-0OIl".parse::<Address>().is_err());
        assert!(bs58::encode([1u8; 16]).into_string().parse::<Address>().is_err());
    }

    // ==================== Predicate Tests ====================

    #[test]
    fn test_expiry_boundary_is_strict() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);
        let w = witness(&owner, &ephemeral, delegation(&owner, &ephemeral, "game.example", 4_600), &outer);
        let predicate = AuthorizationPredicate::new(&img);

        assert!(predicate.approve(&outer, &w, 4_599));
        assert_eq!(
            predicate.evaluate(&outer, &w, 4_600),
            Verdict::Reject(RejectReason::DelegationExpired { now: 4_600, expiry: 4_600 })
        );
        assert!(!predicate.approve(&outer, &w, 4_601));
    }

    #[test]
    fn test_origin_binding() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img_b = image(&[&owner], "site-b.example");
        let outer = outer_for(&img_b, 10);
        let w = witness(&owner, &ephemeral, delegation(&owner, &ephemeral, "site-a.example", 10_000), &outer);

        let predicate = AuthorizationPredicate::new(&img_b);
        assert_eq!(
            predicate.evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::OriginMismatch)
        );
        assert!(!predicate.approve(&outer, &w, 1_000));

        // Same witness is fine for the image it was issued for
        let img_a = image(&[&owner], "site-a.example");
        let outer_a = outer_for(&img_a, 10);
        let w_a = witness(&owner, &ephemeral, w.delegation.clone(), &outer_a);
        assert!(AuthorizationPredicate::new(&img_a).approve(&outer_a, &w_a, 1_000));
    }

    #[test]
    fn test_owner_membership() {
        let owner = signing_key(1);
        let stranger = signing_key(2);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);

        // Well-formed and validly signed, but by a key outside the set
        let w = witness(&stranger, &ephemeral, delegation(&stranger, &ephemeral, "game.example", 10_000), &outer);
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::UnauthorizedSender)
        );
    }

    #[test]
    fn test_witness_binding_prevents_cross_transaction_replay() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let predicate = AuthorizationPredicate::new(&img);

        let tx_a = outer_for(&img, 10);
        let tx_b = outer_for(&img, 11);
        let w = witness(&owner, &ephemeral, delegation(&owner, &ephemeral, "game.example", 10_000), &tx_a);

        assert!(predicate.approve(&tx_a, &w, 1_000));
        assert_eq!(
            predicate.evaluate(&tx_b, &w, 1_000),
            Verdict::Reject(RejectReason::InvalidSessionSignature)
        );
    }

    #[test]
    fn test_session_signature_must_come_from_delegated_key() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let other = signing_key(51);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);

        let w = witness(&owner, &other, delegation(&owner, &ephemeral, "game.example", 10_000), &outer);
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::InvalidSessionSignature)
        );
    }

    #[test]
    fn test_tampered_delegation_fails_owner_signature() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);
        let mut w = witness(&owner, &ephemeral, delegation(&owner, &ephemeral, "game.example", 2_000), &outer);

        // Extend the expiry after the owner signed
        w.delegation.expiry = 9_999_999;
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 3_000),
            Verdict::Reject(RejectReason::InvalidOwnerSignature)
        );

        // Swap in another ephemeral key
        let mut w = witness(&owner, &ephemeral, delegation(&owner, &ephemeral, "game.example", 2_000), &outer);
        w.delegation.receiver = public(&signing_key(52));
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::InvalidOwnerSignature)
        );
    }

    #[test]
    fn test_malformed_note_fails_closed() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);

        let mut d = delegation(&owner, &ephemeral, "game.example", 10_000);
        d.note = b"game.example".to_vec();
        let w = witness(&owner, &ephemeral, d, &outer);

        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::MalformedNote(NoteError::BadTag))
        );
    }

    #[test]
    fn test_value_bearing_delegation_rejected() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);

        let mut d = delegation(&owner, &ephemeral, "game.example", 10_000);
        d.amount = 1;
        let w = witness(&owner, &ephemeral, d, &outer);
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::MalformedDelegation)
        );

        let mut d = delegation(&owner, &ephemeral, "game.example", 10_000);
        d.kind = TxKind::Payment;
        let w = witness(&owner, &ephemeral, d, &outer);
        assert!(!AuthorizationPredicate::new(&img).approve(&outer, &w, 1_000));
    }

    #[test]
    fn test_rejections_name_the_failing_gate() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let predicate = AuthorizationPredicate::new(&img);
        let outer = outer_for(&img, 10);

        let mut d = delegation(&owner, &ephemeral, "game.example", 10_000);
        d.amount = 1;
        let w = witness(&owner, &ephemeral, d, &outer);
        assert_eq!(
            predicate.first_failure(outer.id(), &w, 1_000),
            Some(("shape", RejectReason::MalformedDelegation))
        );

        let d = delegation(&owner, &ephemeral, "game.example", 10_000);
        let w = witness(&owner, &ephemeral, d, &outer);
        assert_eq!(
            predicate.first_failure(outer.id(), &w, 10_000),
            Some((
                "expiry",
                RejectReason::DelegationExpired {
                    now: 10_000,
                    expiry: 10_000
                }
            ))
        );
        assert_eq!(predicate.first_failure(outer.id(), &w, 9_999), None);
    }

    #[test]
    fn test_shape_gate_rechecks_parameters() {
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let long_origin = "x".repeat(65);

        let predicate = AuthorizationPredicate::from_params(
            OwnerKeySet::new(vec![public(&owner)]),
            Origin::from(long_origin.as_str()),
        );
        let mut outer = Transaction::payment(Address([3; 32]), 1, 1);
        outer.sender = Address([4; 32]);

        let mut d = delegation(&owner, &ephemeral, "game.example", 10_000);
        d.note = long_origin.as_bytes().to_vec();
        let w = witness(&owner, &ephemeral, d, &outer);

        assert_eq!(
            predicate.evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::Oversize)
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        // owners = [O1], origin = "game.example", ttl = 3600
        let o1 = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&o1], "game.example");

        // Issued at t = 1000
        let issued_at = 1_000u64;
        let d = delegation(&o1, &ephemeral, "game.example", issued_at + 3_600);
        assert_eq!(d.expiry, 4_600);

        // Signed at t = 2000 from the derived address
        let outer = outer_for(&img, 250);
        assert_eq!(outer.sender, img.address());
        let w = witness(&o1, &ephemeral, d, &outer);

        let predicate = AuthorizationPredicate::new(&img);
        assert!(predicate.approve(&outer, &w, 2_500));
        assert_eq!(
            predicate.evaluate(&outer, &w, 4_700),
            Verdict::Reject(RejectReason::DelegationExpired { now: 4_700, expiry: 4_600 })
        );
    }

    #[test]
    fn test_recovery_key_is_equivalent_owner() {
        let o1 = signing_key(1);
        let o2 = signing_key(2);
        let ephemeral = signing_key(50);
        let img = image(&[&o1, &o2], "game.example");
        let outer = outer_for(&img, 10);
        let predicate = AuthorizationPredicate::new(&img);

        let by_primary = witness(&o1, &ephemeral, delegation(&o1, &ephemeral, "game.example", 10_000), &outer);
        let by_recovery = witness(&o2, &ephemeral, delegation(&o2, &ephemeral, "game.example", 10_000), &outer);

        assert_eq!(predicate.evaluate(&outer, &by_primary, 1_000), Verdict::Approve);
        assert_eq!(predicate.evaluate(&outer, &by_recovery, 1_000), Verdict::Approve);
    }

    #[test]
    fn test_owner_signature_over_outer_bytes_is_not_a_delegation() {
        // Domain separation: owner signature over the delegation's bytes
        // without the domain prefix must not verify
        let owner = signing_key(1);
        let ephemeral = signing_key(50);
        let img = image(&[&owner], "game.example");
        let outer = outer_for(&img, 10);
        let d = delegation(&owner, &ephemeral, "game.example", 10_000);

        let canonical = d.canonical_bytes();
        let undomained = &canonical[b"DLGTX".len()..];
        let w = AuthorizationWitness {
            delegation: d.clone(),
            delegation_signature: owner.sign(undomained).into(),
            session_signature: ephemeral.sign(outer.id().as_bytes()).into(),
        };
        assert_eq!(
            AuthorizationPredicate::new(&img).evaluate(&outer, &w, 1_000),
            Verdict::Reject(RejectReason::InvalidOwnerSignature)
        );
    }
}

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::state::{decode_origin_note, encode_origin_note, instantiate, Origin, OwnerKeySet};
    use crate::crypto::PublicKey;
    use ed25519_dalek::SigningKey;

    fn owner_key(seed: [u8; 32]) -> PublicKey {
        SigningKey::from_bytes(&seed).verifying_key().into()
    }

    proptest! {
        /// Property: decoding arbitrary bytes never panics, and anything
        /// that decodes re-encodes to the same note.
        #[test]
        fn prop_note_decode_total(note in prop::collection::vec(any::<u8>(), 0..96)) {
            if let Ok(origin) = decode_origin_note(&note) {
                prop_assert_eq!(encode_origin_note(&origin).unwrap(), note);
            }
        }

        /// Property: every origin within the limit survives the note codec
        #[test]
        fn prop_note_roundtrip(origin in prop::collection::vec(any::<u8>(), 0..=64)) {
            let origin = Origin::new(origin);
            let note = encode_origin_note(&origin).unwrap();
            prop_assert_eq!(decode_origin_note(&note).unwrap(), origin);
        }

        /// Property: instantiation is a pure function of its inputs
        #[test]
        fn prop_instantiate_deterministic(
            seed in prop::array::uniform32(any::<u8>()),
            origin in prop::collection::vec(any::<u8>(), 0..=64),
        ) {
            let owners = OwnerKeySet::new(vec![owner_key(seed)]);
            let origin = Origin::new(origin);

            let a = instantiate(&owners, &origin).unwrap();
            let b = instantiate(&owners, &origin).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
            prop_assert_eq!(a.address(), b.address());
        }
    }
}
