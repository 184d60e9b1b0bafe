#[cfg(test)]
mod tests {
    use crate::catalog::fixtures::{monster, sonia_catalog, CatalogBuilder};
    use crate::catalog::{Attribute, EvolutionKind, MonsterId, MonsterType, SeriesType};
    use crate::config::FinderConfig;
    use crate::index::sheets::SeriesAlias;
    use crate::index::CuratorSheets;
    use crate::search::matches::MatchKind;
    use crate::search::MonsterFinder;
    use crate::snapshot::SnapshotReader;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn finder(catalog: CatalogBuilder) -> MonsterFinder {
        MonsterFinder::new(
            SnapshotReader::fixed(Arc::new(catalog.snapshot())),
            FinderConfig::default(),
        )
    }

    async fn best(finder: &MonsterFinder, query: &str) -> Option<MonsterId> {
        finder.find(query).await.unwrap().0.map(|m| m.id)
    }

    async fn all(finder: &MonsterFinder, query: &str) -> Vec<MonsterId> {
        finder
            .find_all(query)
            .await
            .unwrap()
            .0
            .iter()
            .map(|m| m.id)
            .collect()
    }

    #[tokio::test]
    async fn awoken_fire_sonia() {
        let finder = finder(sonia_catalog());
        assert_eq!(best(&finder, "awoken r sonia").await, Some(1234));
        assert_eq!(best(&finder, "Awoken R Sonia").await, Some(1234));
        // dark is only the sub attribute, which still counts
        assert_eq!(best(&finder, "awoken d sonia").await, Some(1234));
        assert_eq!(best(&finder, "awoken b sonia").await, None);
    }

    #[tokio::test]
    async fn long_attribute_names_match_sub_attribute() {
        let finder = finder(sonia_catalog());
        assert_eq!(best(&finder, "dark sonia").await, Some(1235));
        assert_eq!(best(&finder, "purple sonia").await, Some(1235));
        assert_eq!(best(&finder, "awoken dark sonia").await, Some(1234));
        assert_eq!(best(&finder, "fire sonia").await, Some(1235));
        assert_eq!(best(&finder, "blue sonia").await, None);
        // a sub attribute hit survives negation
        assert_eq!(best(&finder, "-dark sonia").await, Some(1235));
    }

    fn prism_shop() -> CatalogBuilder {
        CatalogBuilder::new()
            .monster(monster(6001, "Prism Knight"))
            .monster(monster(6002, "Prism Lancer"))
            .monster(monster(6003, "Prism Archer"))
            .monster(monster(6004, "Prism Mage"))
            .monster(monster(6005, "Prism Token"))
            .exchange(6001, &[6005], false)
            .expired_exchange(6002, &[6005])
            .exchange(6003, &[6005], true)
            .evolution(6003, 6004, EvolutionKind::Normal, &[])
    }

    #[tokio::test]
    async fn exchange_modifiers_skip_closed_contracts() {
        let finder = finder(prism_shop());
        let cases: &[(&str, &[MonsterId])] = &[
            ("exchange prism", &[6001, 6003]),
            ("mp prism", &[6001, 6003]),
            ("shop prism", &[6001, 6003]),
            ("permexchange prism", &[6003, 6004]),
            ("exchange:yes prism", &[6001, 6003]),
            ("exchange:no prism", &[6002, 6004, 6005]),
        ];
        for (query, expected) in cases {
            let ids: BTreeSet<MonsterId> = all(&finder, query).await.into_iter().collect();
            let expected: BTreeSet<MonsterId> = expected.iter().copied().collect();
            assert_eq!(ids, expected, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn alt_names_count_as_fluff() {
        let catalog = CatalogBuilder::new()
            .monster(monster(1250, "Aurora Seraph").alt_name("Dawn Bringer"))
            .monster(monster(1251, "Dawn Knight"));
        let finder = finder(catalog);
        assert_eq!(best(&finder, "bringer").await, Some(1250));
        // a display-name hit outweighs an alt-name hit
        assert_eq!(best(&finder, "dawn").await, Some(1251));
        assert_eq!(all(&finder, "dawn").await.len(), 2);
    }

    fn ruby_tree() -> CatalogBuilder {
        CatalogBuilder::new()
            .monster(monster(7001, "Ruby Whelp"))
            .monster(monster(7002, "Crown of Embers, Ruby Wyrmlord"))
            .evolution(7001, 7002, EvolutionKind::Normal, &[])
    }

    #[tokio::test]
    async fn consistent_tree_names_reach_every_form() {
        let plain = finder(ruby_tree());
        assert_eq!(best(&plain, "whelp").await, Some(7001));

        let sheets = CuratorSheets {
            consistent_name_trees: vec![7001],
            ..Default::default()
        };
        let shared = finder(ruby_tree().sheets(sheets));
        // both forms now hit directly; the higher adjusted rarity wins
        assert_eq!(best(&shared, "whelp").await, Some(7002));
        assert_eq!(best(&shared, "7001").await, Some(7001));
        assert_eq!(best(&shared, "7002").await, Some(7002));
    }

    #[tokio::test]
    async fn merged_phrase_run_wins_when_it_scores_higher() {
        let without = finder(sonia_catalog());
        assert_eq!(best(&without, "crimson queen").await, None);

        let finder = finder(sonia_catalog().nickname(1234, "crimson queen"));
        assert_eq!(best(&finder, "crimson queen").await, Some(1234));
        let (info, _) = finder.find_debug("crimson queen").await.unwrap();
        let evidence = &info.scores[&1234].name_matches[0];
        assert_eq!(evidence.matched, "crimsonqueen");
        assert_eq!(evidence.kind, MatchKind::Manual);
    }

    #[tokio::test]
    async fn unmerged_run_wins_when_modifiers_add_score() {
        let finder = finder(sonia_catalog().nickname(1234, "red sonia"));
        // "red" as an attribute plus "sonia" as a name beats the lone nickname hit
        assert_eq!(best(&finder, "red sonia").await, Some(1235));
        assert_eq!(best(&finder, "redsonia").await, Some(1234));
    }

    #[tokio::test]
    async fn skill_boost_count_with_equip_suffix() {
        let catalog = CatalogBuilder::new()
            .monster(monster(7777, "Booster Orb").equip().awakenings(&[21, 21, 21]))
            .monster(monster(7778, "Booster Shard").equip().awakenings(&[21, 21]))
            .monster(monster(7779, "Booster Dragon").awakenings(&[21, 21, 21]))
            .monster(monster(7780, "Plus Booster").equip().awakenings(&[56, 21]));
        let finder = finder(catalog);

        assert_eq!(best(&finder, "3-sb equip").await, Some(7777));
        let ids: BTreeSet<MonsterId> = all(&finder, "3-sb equip").await.into_iter().collect();
        // a Skill Boost+ slot is worth two plain ones
        assert_eq!(ids, BTreeSet::from([7777, 7780]));
        assert_eq!(best(&finder, "3-sb -equip").await, Some(7779));
    }

    #[tokio::test]
    async fn material_of_material_chain() {
        let catalog = sonia_catalog()
            .monster(monster(1238, "Ember Seed").types(&[MonsterType::Evolve]).rarity(2))
            .monster(monster(1239, "Ember Mask").types(&[MonsterType::Evolve]).rarity(3))
            .evolution(1239, 1240, EvolutionKind::Normal, &[1238]);
        let finder = finder(catalog);

        let query = "hasmat:(hasmat:(ember seed))";
        let (monster, extras) = finder.find(query).await.unwrap();
        assert_eq!(monster.map(|m| m.id), Some(1234));
        assert_eq!(extras.subquery_results.get(query), Some(&BTreeSet::from([1240])));
        assert_eq!(extras.subquery_matches.get(query), Some(&BTreeSet::from([1234])));

        assert_eq!(best(&finder, "hasmat:(ember seed)").await, Some(1240));
        assert_eq!(best(&finder, "selfhasmat:(ember seed)").await, Some(1240));
        // bare form; both masks match the nested word exactly
        assert_eq!(best(&finder, "hasmat:mask").await, Some(1234));
        assert_eq!(best(&finder, "hasmat:mask revo").await, None);
    }

    fn knights() -> CatalogBuilder {
        CatalogBuilder::new()
            .monster(monster(5001, "Grove Knight").attrs(Attribute::Fire, Some(Attribute::Wood)))
            .monster(monster(5002, "Tidal Knight").attrs(Attribute::Fire, Some(Attribute::Water)))
            .monster(monster(5003, "Ash Knight").attrs(Attribute::Fire, Some(Attribute::Dark)))
    }

    #[tokio::test]
    async fn or_token_branch_priority() {
        let finder = finder(knights());

        // without branch priority the lower tree id wins the tie
        assert_eq!(best(&finder, "[r/b r/g] knight").await, Some(5001));
        assert_eq!(all(&finder, "[r/b r/g] knight").await, vec![5001, 5002]);

        assert_eq!(best(&finder, "[r/b r/g] knight --ormodprio").await, Some(5002));
        assert_eq!(
            all(&finder, "[r/b r/g] knight --ormodprio").await,
            vec![5002, 5001]
        );
    }

    #[tokio::test]
    async fn or_token_priority_from_config() {
        let config = FinderConfig {
            ormod_prio: true,
            ..Default::default()
        };
        let finder = MonsterFinder::new(
            SnapshotReader::fixed(Arc::new(knights().snapshot())),
            config,
        );
        assert_eq!(best(&finder, "[r/b r/g] knight").await, Some(5002));
        assert_eq!(best(&finder, "[r/b r/g] knight --noormodprio").await, Some(5001));
    }

    #[tokio::test]
    async fn rarity_comparators_with_collab() {
        let catalog = CatalogBuilder::new()
            .series(1, "Starfall", SeriesType::Regular)
            .series(7, "Crossover", SeriesType::Collab)
            .monster(monster(8001, "Star Guardian").series(7).rarity(9))
            .monster(monster(8002, "Moon Guardian").series(7).rarity(10))
            .monster(monster(8003, "Sun Guardian").series(1).rarity(9))
            .monster(monster(8004, "Comet Guardian").series(7).rarity(8));
        let finder = finder(catalog);

        assert_eq!(best(&finder, "rarity:>=9 collab").await, Some(8001));

        let cases: &[(&str, &[MonsterId])] = &[
            ("rarity:>=9 collab", &[8001, 8002]),
            ("rarity:=9 collab", &[8001]),
            ("rarity:>9 collab", &[8002]),
            ("rarity:<=9 collab", &[8001, 8004]),
            ("rarity:<9 collab", &[8004]),
            ("rarity:>=9 -collab", &[8003]),
        ];
        for (query, expected) in cases {
            let ids: BTreeSet<MonsterId> = all(&finder, query).await.into_iter().collect();
            let expected: BTreeSet<MonsterId> = expected.iter().copied().collect();
            assert_eq!(ids, expected, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn nickname_that_is_also_a_modifier() {
        let sheets = CuratorSheets {
            series_aliases: vec![SeriesAlias {
                series_id: 9,
                alias: "cloud".to_string(),
            }],
            ..Default::default()
        };
        let catalog = CatalogBuilder::new()
            .series(9, "Sky Islands", SeriesType::Regular)
            .monster(monster(5670, "Nimbus Wyvern").series(9))
            .monster(monster(5678, "Cirrus Knight").series(9))
            .sheets(sheets)
            .nickname(5678, "cloud");
        let finder = finder(catalog);

        // alone, the word names the nicknamed monster
        assert_eq!(best(&finder, "cloud").await, Some(5678));
        // next to a name it filters by series
        assert_eq!(best(&finder, "cloud wyvern").await, Some(5670));
        assert_eq!(best(&finder, "cloud knight").await, Some(5678));
    }
}
