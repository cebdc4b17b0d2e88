use anyhow::Result;
use pedigree_layout::{
    align_pedigree, compute_connectors, generation_depths, PedigreeAligner, PedigreeError,
    PedigreeInput, PedigreeLayout, RelationCode, ScalingParams, Sex, SpouseLink, TwinIndicator,
    TwinKind, ARC_POINTS,
};
use test_log::test;

fn fixture() -> Result<PedigreeInput> {
    Ok(ron::from_str(include_str!("fixtures/three_generations.ron"))?)
}

/// Checks that hold for every layout
fn assert_well_formed(input: &PedigreeInput, layout: &PedigreeLayout) {
    for person in 0..input.len() {
        assert!(layout.contains(person), "individual {person} is missing");
    }

    for (g, row) in layout.pos.iter().enumerate() {
        assert_eq!(row.len(), layout.n[g]);
        assert_eq!(layout.nid[g].len(), layout.n[g]);
        for pair in row.windows(2) {
            assert!(pair[1] - pair[0] >= 1.0 - 1e-3, "overlap in generation {g}: {row:?}");
        }
    }

    // Family pointers land on the two parents
    for g in 1..layout.generations() {
        for (c, fam) in layout.fam[g].iter().enumerate() {
            let Some(f) = *fam else {
                continue;
            };
            let child = layout.nid[g][c];
            let mut drawn = [layout.nid[g - 1][f], layout.nid[g - 1][f + 1]];
            drawn.sort_unstable();
            let (father, mother) = input.parents(child).unwrap();
            let mut parents = [father, mother];
            parents.sort_unstable();
            assert_eq!(drawn, parents, "wrong parents for {child}");
        }
    }
}

fn nuclear_family() -> PedigreeInput {
    let mut ped = PedigreeInput::new();
    let dad = ped.add_individual("dad", Sex::Male, None, None);
    let mom = ped.add_individual("mom", Sex::Female, None, None);
    ped.add_individual("son", Sex::Male, Some(dad), Some(mom));
    ped.add_individual("daughter", Sex::Female, Some(dad), Some(mom));
    ped
}

/// First cousins 6 and 7 have a child together
fn cousin_marriage() -> PedigreeInput {
    let mut ped = PedigreeInput::new();
    let gp = ped.add_individual("grandpa", Sex::Male, None, None);
    let gm = ped.add_individual("grandma", Sex::Female, None, None);
    let son = ped.add_individual("son", Sex::Male, Some(gp), Some(gm));
    let daughter = ped.add_individual("daughter", Sex::Female, Some(gp), Some(gm));
    let wife = ped.add_individual("wife", Sex::Female, None, None);
    let husband = ped.add_individual("husband", Sex::Male, None, None);
    let cousin_a = ped.add_individual("cousin_a", Sex::Male, Some(son), Some(wife));
    let cousin_b = ped.add_individual("cousin_b", Sex::Female, Some(husband), Some(daughter));
    ped.add_individual("child", Sex::Unknown, Some(cousin_a), Some(cousin_b));
    ped
}

/// Cousin 6 has a child with each of 8, 9 and his first cousin 7
fn cousin_as_third_partner() -> PedigreeInput {
    let mut ped = cousin_marriage();
    ped.id.truncate(8);
    ped.father.truncate(8);
    ped.mother.truncate(8);
    ped.sex.truncate(8);
    let first = ped.add_individual("first", Sex::Female, None, None);
    let second = ped.add_individual("second", Sex::Female, None, None);
    ped.add_individual("with_first", Sex::Male, Some(6), Some(first));
    ped.add_individual("with_second", Sex::Male, Some(6), Some(second));
    ped.add_individual("with_cousin", Sex::Male, Some(6), Some(7));
    ped
}

/// Individual 6 marries into the family and also has a sibling, so is drawn twice
fn married_in_with_sibling() -> PedigreeInput {
    let mut ped = PedigreeInput::new();
    let a = ped.add_individual("a", Sex::Male, None, None);
    let b = ped.add_individual("b", Sex::Female, None, None);
    let son = ped.add_individual("son", Sex::Male, Some(a), Some(b));
    let c = ped.add_individual("c", Sex::Male, None, None);
    let d = ped.add_individual("d", Sex::Female, None, None);
    ped.add_individual("sister", Sex::Female, Some(c), Some(d));
    let bride = ped.add_individual("bride", Sex::Female, Some(c), Some(d));
    ped.add_individual("grandchild", Sex::Male, Some(son), Some(bride));
    ped
}

#[test]
fn nuclear_family_has_two_generations() -> Result<()> {
    let ped = nuclear_family();
    let layout = align_pedigree(&ped)?;
    assert_eq!(layout.generations(), 2);
    assert_eq!(layout.n, vec![2, 2]);
    assert_eq!(layout.spouse[0][0], SpouseLink::Partner);
    assert_eq!(layout.spouse[0][0].code(), 1);
    assert!(layout.twins.is_none());
    assert_well_formed(&ped, &layout);

    // The children are centred under their parents
    let parents = (layout.pos[0][0] + layout.pos[0][1]) / 2.0;
    let children = (layout.pos[1][0] + layout.pos[1][1]) / 2.0;
    assert!((parents - children).abs() < 0.1);
    Ok(())
}

#[test]
fn fixture_has_three_generations() -> Result<()> {
    let ped = fixture()?;
    ped.validate()?;
    assert_eq!(generation_depths(&ped.father, &ped.mother)?, vec![0, 0, 1, 0, 2, 2, 2]);

    let layout = align_pedigree(&ped)?;
    assert_eq!(layout.generations(), 3);
    assert_eq!(layout.nid[0], vec![0, 1]);
    assert_eq!(layout.nid[1], vec![2, 3]);
    assert_eq!(layout.nid[2], vec![4, 6, 5]);
    assert_well_formed(&ped, &layout);
    Ok(())
}

#[test]
fn twins_get_an_indicator() -> Result<()> {
    let ped = fixture()?;
    let layout = align_pedigree(&ped)?;
    let twins = layout.twins.as_ref().unwrap();
    assert_eq!(twins[2][0], Some(TwinKind::Monozygotic));
    assert_eq!(twins[2][1], None);

    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    assert_eq!(connectors.twins.len(), 1);
    assert!(matches!(
        connectors.twins[0],
        TwinIndicator::Bar {
            generation: 2,
            column: 0,
            kind: TwinKind::Monozygotic,
            ..
        }
    ));
    Ok(())
}

#[test]
fn single_parent_is_rejected() {
    let mut ped = nuclear_family();
    ped.mother[3] = None;
    assert_eq!(
        align_pedigree(&ped),
        Err(PedigreeError::SingleParent { person: 3 })
    );
}

#[test]
fn ancestry_cycle_is_rejected() {
    let mut ped = PedigreeInput::new();
    ped.add_individual("a", Sex::Male, Some(1), Some(2));
    ped.add_individual("b", Sex::Male, Some(0), Some(2));
    ped.add_individual("c", Sex::Female, None, None);
    assert!(matches!(
        align_pedigree(&ped),
        Err(PedigreeError::CyclicAncestry { .. })
    ));
}

#[test]
fn bad_relation_is_rejected() {
    let mut ped = nuclear_family();
    ped.add_relation(2, 9, RelationCode::DizygoticTwin);
    assert!(align_pedigree(&ped).is_err());
}

#[test]
fn declared_partners_are_marked() -> Result<()> {
    let mut ped = PedigreeInput::new();
    let wife = ped.add_individual("wife", Sex::Female, None, None);
    let husband = ped.add_individual("husband", Sex::Male, None, None);
    ped.add_relation(wife, husband, RelationCode::Spouse);

    let layout = align_pedigree(&ped)?;
    assert_eq!(layout.nid, vec![vec![husband, wife]]);
    assert_eq!(layout.spouse[0][0], SpouseLink::Partner);
    assert!(layout.spouse.iter().flatten().any(|link| link.code() >= 1));
    Ok(())
}

#[test]
fn cousins_are_marked_consanguineous() -> Result<()> {
    let ped = cousin_marriage();
    let layout = align_pedigree(&ped)?;
    assert_eq!(layout.generations(), 4);
    assert_well_formed(&ped, &layout);

    let (g, c) = layout.occurrences(6)[0];
    assert_eq!(layout.nid[g][c + 1], 7);
    assert_eq!(layout.spouse[g][c], SpouseLink::Consanguineous);
    assert_eq!(layout.spouse[g][c].code(), 2);

    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    let line = connectors
        .spouses
        .iter()
        .find(|s| s.generation == g && s.column == c)
        .unwrap();
    assert_eq!(line.lines.len(), 2);
    assert!(connectors
        .spouses
        .iter()
        .filter(|s| s.link == SpouseLink::Partner)
        .all(|s| s.lines.len() == 1));
    Ok(())
}

#[test]
fn cousin_among_several_partners_is_marked_consanguineous() -> Result<()> {
    let ped = cousin_as_third_partner();
    let layout = align_pedigree(&ped)?;
    assert_well_formed(&ped, &layout);

    // 6 is repeated so that each of his three couples is adjacent
    assert_eq!(layout.nid[2], vec![8, 6, 9, 6, 7]);
    assert_eq!(
        layout.spouse[2],
        vec![
            SpouseLink::Partner,
            SpouseLink::Partner,
            SpouseLink::Unlinked,
            SpouseLink::Consanguineous,
            SpouseLink::Unlinked,
        ]
    );
    assert_eq!(layout.fam[3], vec![Some(0), Some(1), Some(3)]);

    // Only his own entry hangs from his parents
    assert_eq!(layout.fam[2][1], Some(0));
    assert_eq!(layout.fam[2][3], None);

    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    let doubled: Vec<_> = connectors.spouses.iter().filter(|s| s.lines.len() == 2).collect();
    assert_eq!(doubled.len(), 1);
    assert_eq!((doubled[0].generation, doubled[0].column), (2, 3));
    assert_eq!(connectors.duplicates.len(), 1);
    assert_eq!(connectors.duplicates[0].person, 6);
    Ok(())
}

#[test]
fn married_in_sibling_gets_a_duplicate_arc() -> Result<()> {
    let ped = married_in_with_sibling();
    let layout = align_pedigree(&ped)?;
    assert_well_formed(&ped, &layout);
    assert_eq!(layout.nid[1], vec![2, 6, 5, 6]);
    assert_eq!(layout.occurrences(6), vec![(1, 1), (1, 3)]);

    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    assert_eq!(connectors.duplicates.len(), 1);
    let arc = &connectors.duplicates[0];
    assert_eq!(arc.person, 6);
    assert!(arc.path.dashed);
    assert_eq!(arc.path.points.len(), ARC_POINTS);
    Ok(())
}

#[test]
fn branch_controls_the_parent_link_shape() -> Result<()> {
    // Unrefined grid: the son hangs left of his parents' midpoint
    let layout = PedigreeAligner::default().compute_grid(&married_in_with_sibling())?;
    let son = |connectors: &pedigree_layout::PedigreeConnectors| {
        connectors
            .parent_child
            .iter()
            .find(|f| f.generation == 1 && f.family == 0)
            .cloned()
            .unwrap()
    };

    let straight = ScalingParams {
        branch: 0.0,
        ..Default::default()
    };
    let connectors = compute_connectors(&layout, &straight)?;
    for family in &connectors.parent_child {
        assert_eq!(family.parent_link.len(), 1);
        assert!(family.parent_link[0].is_vertical());
    }
    let family = son(&connectors);
    assert_eq!(family.parent_link[0].from.x, 0.5);
    assert_eq!(family.sibling_bar.to.x, 0.5);

    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    for family in &connectors.parent_child {
        let link = &family.parent_link;
        assert_eq!(link.len(), 3);
        assert!(link[0].is_horizontal());
        assert!(link[1].is_vertical());
        assert!(link[2].is_horizontal());
        assert!(family.sibling_bar.is_horizontal());
    }
    let link = son(&connectors).parent_link;
    assert!(!link[0].is_vertical());
    assert!(!link[1].is_horizontal());
    assert!(!link[2].is_vertical());
    assert_eq!(link[2].to.x, 0.5);
    Ok(())
}

#[test]
fn unpacked_layout_is_well_formed() -> Result<()> {
    for ped in [
        fixture()?,
        cousin_marriage(),
        cousin_as_third_partner(),
        married_in_with_sibling(),
    ] {
        let aligner = PedigreeAligner::new(false);
        let grid = aligner.compute_grid(&ped)?;
        for row in &grid.pos {
            for pair in row.windows(2) {
                assert!(pair[1] > pair[0]);
            }
        }
        assert_well_formed(&ped, &aligner.layout(&ped)?);
    }
    Ok(())
}

#[test]
fn layout_is_deterministic() -> Result<()> {
    let ped = cousin_marriage();
    let first = align_pedigree(&ped)?;
    let second = align_pedigree(&ped)?;
    assert_eq!(first, second);
    assert_eq!(ron::to_string(&first)?, ron::to_string(&second)?);

    let params = ScalingParams::default();
    assert_eq!(
        compute_connectors(&first, &params)?,
        compute_connectors(&second, &params)?
    );
    Ok(())
}

#[test]
fn empty_pedigree_has_no_generations() -> Result<()> {
    let layout = align_pedigree(&PedigreeInput::new())?;
    assert_eq!(layout.generations(), 0);
    let connectors = compute_connectors(&layout, &ScalingParams::default())?;
    assert!(connectors.spouses.is_empty());
    Ok(())
}
