#[cfg(test)]
mod tests {
    use crate::catalog::fixtures::sonia_catalog;
    use crate::catalog::MonsterId;
    use crate::config::FinderConfig;
    use crate::index::CuratorSheets;
    use crate::search::MonsterFinder;
    use crate::snapshot::{Snapshot, SnapshotReader};
    use std::sync::Arc;

    /// Query → expected best match over the Sonia fixture
    const QUERIES: &[(&str, Option<MonsterId>)] = &[
        ("sonia", Some(1235)),
        ("soina", Some(1235)),
        ("base sonia", Some(1230)),
        ("awoken sonia", Some(1234)),
        ("revo sonia", Some(1235)),
        ("d sonia", Some(1235)),
        ("dark sonia", Some(1235)),
        ("purple sonia", Some(1235)),
        ("r/d sonia", Some(1235)),
        ("-r sonia", None),
        ("gem sonia", Some(1241)),
        ("1234", Some(1234)),
        ("1241", Some(1241)),
        ("flame mask", Some(1240)),
        ("-gem evomat", Some(1240)),
        ("hasmat:(flame mask)", Some(1234)),
        ("sametree:1230 awoken", Some(1234)),
        ("seriesof:(awoken sonia) base", Some(1230)),
        ("sonia // trailing comment", Some(1235)),
    ];

    /// Same fixture with the Sonia tree sharing its base's display name
    const CONSISTENT_NAME_QUERIES: &[(&str, Option<MonsterId>)] = &[
        ("1230", Some(1230)),
        ("1231", Some(1231)),
        ("1234", Some(1234)),
        ("sonia", Some(1235)),
    ];

    /// (token, monster, is_fluff)
    const NAME_TOKENS: &[(&str, MonsterId, bool)] = &[
        ("sonia", 1231, false),
        ("goddess", 1231, true),
        ("power", 1231, true),
        ("of", 1231, true),
        ("sonia", 1235, false),
        ("reincarnated", 1235, true),
        ("crimson", 1235, true),
        ("dragoness", 1235, true),
        ("flame", 1240, false),
        ("mask", 1240, false),
        ("sonias", 1241, false),
        ("gem", 1241, true),
    ];

    /// (modifier, monster, present)
    const MODIFIERS: &[(&str, MonsterId, bool)] = &[
        ("base", 1230, true),
        ("base", 1231, false),
        ("evo", 1231, true),
        ("rd", 1230, true),
        ("dragon", 1230, true),
        ("god", 1231, true),
        ("sb", 1231, true),
        ("bind", 1231, true),
        ("awoken", 1234, true),
        ("awoken", 1235, false),
        ("inheritable", 1234, true),
        ("8*", 1234, true),
        ("revo", 1235, true),
        ("sa-sb+", 1235, true),
        ("sb+", 1235, false),
        ("evomat", 1240, true),
        ("gem", 1241, true),
    ];

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(sonia_catalog().snapshot())
    }

    #[tokio::test]
    async fn best_match_table() {
        let finder = MonsterFinder::new(SnapshotReader::fixed(snapshot()), FinderConfig::default());
        for (query, expected) in QUERIES {
            let found = finder.find(query).await.unwrap().0.map(|m| m.id);
            assert_eq!(found, *expected, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn consistent_name_table() {
        let sheets = CuratorSheets {
            consistent_name_trees: vec![1230],
            ..Default::default()
        };
        let snapshot = Arc::new(sonia_catalog().sheets(sheets).snapshot());
        for id in [1231, 1234, 1235] {
            let tokens = snapshot.index.tokens_for(id).expect("monster indexed");
            assert!(!tokens.name.contains("1230"), "{} holds the base id", id);
        }

        let finder = MonsterFinder::new(SnapshotReader::fixed(snapshot), FinderConfig::default());
        for (query, expected) in CONSISTENT_NAME_QUERIES {
            let found = finder.find(query).await.unwrap().0.map(|m| m.id);
            assert_eq!(found, *expected, "query {:?}", query);
        }
    }

    #[test]
    fn name_and_fluff_token_table() {
        let snapshot = snapshot();
        for (token, id, is_fluff) in NAME_TOKENS {
            let tokens = snapshot.index.tokens_for(*id).expect("monster indexed");
            let (own, other) = if *is_fluff {
                (&tokens.fluff, &tokens.name)
            } else {
                (&tokens.name, &tokens.fluff)
            };
            assert!(own.contains(*token), "{} should hold {:?}", id, token);
            assert!(!other.contains(*token), "{} should not hold {:?} twice", id, token);
        }
    }

    #[test]
    fn modifier_table() {
        let snapshot = snapshot();
        for (modifier, id, present) in MODIFIERS {
            let modifiers = snapshot.index.modifiers_of(*id).expect("monster indexed");
            assert_eq!(
                modifiers.contains(*modifier),
                *present,
                "modifier {:?} on {}",
                modifier,
                id
            );
        }
    }
}
