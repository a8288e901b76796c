//! The standard match: tower roster, eight waves, the default map and the
//! reaction table.

use std::collections::BTreeMap;

use crate::catalog::*;
use crate::geometry::Vector2;
use crate::types::*;

impl Catalog {
    pub fn standard() -> Self {
        Self {
            towers: standard_towers(),
            waves: standard_waves(),
            map: standard_map(),
            reactions: standard_reactions(),
        }
    }
}

fn add(field: FieldPath, amount: f64) -> StatDelta {
    StatDelta::new(field, DeltaOp::Add(amount))
}

fn scale(field: FieldPath, factor: f64) -> StatDelta {
    StatDelta::new(field, DeltaOp::MultiplyFactor(factor))
}

fn upgrade(tier: u8, cost: u32, deltas: Vec<StatDelta>) -> TowerUpgrade {
    TowerUpgrade { tier, cost, deltas }
}

pub fn standard_towers() -> Vec<TowerConfig> {
    use FieldPath::*;

    vec![
        TowerConfig {
            id: "arrow_tower".into(),
            name: "Arrow Tower".into(),
            cost: 50,
            required_class: None,
            element: None,
            target_type: TargetType::Both,
            base_damage: 10.0,
            range: 3.5,
            attack_period_sec: 0.8,
            splash_radius: 0.0,
            on_hit: vec![],
            aura: None,
            upgrades: vec![
                upgrade(2, 35, vec![add(BaseDamage, 5.0), add(Range, 0.5)]),
                upgrade(3, 70, vec![add(BaseDamage, 8.0), scale(AttackPeriodSec, -0.15)]),
            ],
        },
        TowerConfig {
            id: "cannon_tower".into(),
            name: "Cannon".into(),
            cost: 100,
            required_class: None,
            element: None,
            target_type: TargetType::Ground,
            base_damage: 25.0,
            range: 3.0,
            attack_period_sec: 2.0,
            splash_radius: 1.5,
            on_hit: vec![],
            aura: None,
            upgrades: vec![
                upgrade(2, 60, vec![add(BaseDamage, 15.0), add(SplashRadius, 0.25)]),
                upgrade(3, 120, vec![add(BaseDamage, 25.0), scale(SplashRadius, 0.2)]),
            ],
        },
        TowerConfig {
            id: "fire_tower".into(),
            name: "Brazier".into(),
            cost: 75,
            required_class: Some(Element::Fire),
            element: Some(Element::Fire),
            target_type: TargetType::Both,
            base_damage: 8.0,
            range: 3.0,
            attack_period_sec: 1.0,
            splash_radius: 0.0,
            on_hit: vec![OnHitEffect::Burn {
                dps: 4.0,
                duration_sec: 3.0,
            }],
            aura: None,
            upgrades: vec![
                upgrade(2, 50, vec![add(BaseDamage, 4.0), add(OnHitDps(0), 3.0)]),
                upgrade(3, 100, vec![scale(BaseDamage, 0.5), add(OnHitDurationSec(0), 2.0)]),
            ],
        },
        TowerConfig {
            id: "water_tower".into(),
            name: "Tide Spire".into(),
            cost: 70,
            required_class: Some(Element::Water),
            element: Some(Element::Water),
            target_type: TargetType::Both,
            base_damage: 6.0,
            range: 3.5,
            attack_period_sec: 1.2,
            splash_radius: 1.0,
            on_hit: vec![OnHitEffect::Soak { duration_sec: 4.0 }],
            aura: None,
            upgrades: vec![
                upgrade(2, 45, vec![add(OnHitDurationSec(0), 2.0), add(SplashRadius, 0.5)]),
                upgrade(3, 90, vec![add(BaseDamage, 8.0), scale(AttackPeriodSec, -0.2)]),
            ],
        },
        TowerConfig {
            id: "frost_tower".into(),
            name: "Frost Obelisk".into(),
            cost: 80,
            required_class: Some(Element::Ice),
            element: Some(Element::Ice),
            target_type: TargetType::Both,
            base_damage: 5.0,
            range: 3.0,
            attack_period_sec: 1.0,
            splash_radius: 0.0,
            on_hit: vec![OnHitEffect::Chill {
                slow: 0.35,
                duration_sec: 2.0,
            }],
            aura: None,
            upgrades: vec![
                upgrade(2, 50, vec![add(OnHitSlow(0), 0.1)]),
                upgrade(3, 100, vec![add(OnHitDurationSec(0), 1.5), add(BaseDamage, 6.0)]),
            ],
        },
        TowerConfig {
            id: "venom_tower".into(),
            name: "Thornbloom".into(),
            cost: 75,
            required_class: Some(Element::Nature),
            element: Some(Element::Nature),
            target_type: TargetType::Ground,
            base_damage: 4.0,
            range: 3.0,
            attack_period_sec: 0.9,
            splash_radius: 0.0,
            on_hit: vec![OnHitEffect::Poison {
                dps: 3.0,
                duration_sec: 5.0,
            }],
            aura: None,
            upgrades: vec![
                upgrade(2, 45, vec![add(OnHitDps(0), 2.0)]),
                upgrade(3, 90, vec![scale(OnHitDps(0), 0.5), add(Range, 0.5)]),
            ],
        },
        TowerConfig {
            id: "war_drum".into(),
            name: "War Drum".into(),
            cost: 90,
            required_class: None,
            element: None,
            target_type: TargetType::Both,
            base_damage: 0.0,
            range: 0.0,
            attack_period_sec: 0.0,
            splash_radius: 0.0,
            on_hit: vec![],
            aura: Some(Aura {
                radius: 2.5,
                damage_bonus: 0.15,
            }),
            upgrades: vec![
                upgrade(2, 60, vec![add(AuraBonus, 0.1)]),
                upgrade(3, 110, vec![add(AuraRadius, 1.0), add(AuraBonus, 0.05)]),
            ],
        },
    ]
}

fn group(enemy_type: EnemyType, count: u32, hp: f64, speed: f64, interval: f64) -> WaveGroup {
    let tags = match enemy_type {
        EnemyType::Flyer => vec![EnemyTag::Flying],
        EnemyType::Runner => vec![EnemyTag::Ground, EnemyTag::Fast],
        EnemyType::Tank => vec![EnemyTag::Ground, EnemyTag::Armored],
        EnemyType::Invisible => vec![EnemyTag::Ground, EnemyTag::Stealth],
        EnemyType::Boss => vec![EnemyTag::Ground, EnemyTag::Boss],
        EnemyType::Grunt | EnemyType::Caster => vec![EnemyTag::Ground],
    };
    WaveGroup {
        enemy_type,
        count,
        hp,
        speed,
        armor: 0.0,
        tags,
        spawn_interval_sec: interval,
        resistances: BTreeMap::new(),
    }
}

impl WaveGroup {
    fn armored(mut self, armor: f64) -> Self {
        self.armor = armor;
        self
    }

    fn resists(mut self, element: Element, fraction: f64) -> Self {
        self.resistances.insert(element, fraction);
        self
    }
}

pub fn standard_waves() -> Vec<WaveConfig> {
    use EnemyType::*;

    vec![
        WaveConfig {
            wave: 1,
            groups: vec![group(Grunt, 5, 30.0, 1.5, 1.0)],
            bounty_gold: 5,
            telegraph: "Scouts approach from the west.".into(),
        },
        WaveConfig {
            wave: 2,
            groups: vec![
                group(Grunt, 8, 40.0, 1.5, 0.9),
                group(Runner, 3, 25.0, 2.5, 1.2),
            ],
            bounty_gold: 5,
            telegraph: "Runners are mixed into the column.".into(),
        },
        WaveConfig {
            wave: 3,
            groups: vec![
                group(Grunt, 6, 55.0, 1.5, 1.0),
                group(Flyer, 4, 35.0, 1.8, 1.5),
            ],
            bounty_gold: 6,
            telegraph: "Wings overhead: flyers ignore ground-only towers.".into(),
        },
        WaveConfig {
            wave: 4,
            groups: vec![
                group(Tank, 3, 180.0, 0.8, 2.5)
                    .armored(3.0)
                    .resists(Element::Fire, 0.25),
                group(Runner, 6, 35.0, 2.5, 1.0),
            ],
            bounty_gold: 7,
            telegraph: "Armored tanks. Fire is less effective.".into(),
        },
        WaveConfig {
            wave: 5,
            groups: vec![
                group(Grunt, 8, 80.0, 1.5, 0.8).armored(1.0),
                group(Caster, 4, 70.0, 1.4, 2.0).resists(Element::Ice, 0.3),
                group(Invisible, 4, 50.0, 1.6, 1.8),
            ],
            bounty_gold: 8,
            telegraph: "Casters shrug off frost.".into(),
        },
        WaveConfig {
            wave: 6,
            groups: vec![
                group(Runner, 10, 60.0, 2.6, 0.7),
                group(Flyer, 6, 70.0, 1.9, 1.2),
            ],
            bounty_gold: 9,
            telegraph: "A fast wave, on foot and in the air.".into(),
        },
        WaveConfig {
            wave: 7,
            groups: vec![
                group(Tank, 5, 320.0, 0.8, 2.0)
                    .armored(5.0)
                    .resists(Element::Nature, 0.3),
                group(Caster, 6, 120.0, 1.4, 1.5).resists(Element::Ice, 0.3),
            ],
            bounty_gold: 10,
            telegraph: "Heavy armor. Toxins struggle to take hold.".into(),
        },
        WaveConfig {
            wave: 8,
            groups: vec![
                group(Boss, 1, 2500.0, 0.6, 1.0)
                    .armored(8.0)
                    .resists(Element::Fire, 0.2)
                    .resists(Element::Water, 0.2)
                    .resists(Element::Ice, 0.2)
                    .resists(Element::Nature, 0.2),
                group(Grunt, 10, 120.0, 1.5, 0.7).armored(2.0),
            ],
            bounty_gold: 12,
            telegraph: "The warlord marches. Hold the line.".into(),
        },
    ]
}

pub fn standard_map() -> MapConfig {
    let zone = |x, y, width, height, min_players| BuildZone {
        x,
        y,
        width,
        height,
        min_players,
    };

    MapConfig {
        width: 30,
        height: 20,
        waypoints: vec![
            Vector2::new(0.0, 10.0),
            Vector2::new(8.0, 10.0),
            Vector2::new(8.0, 4.0),
            Vector2::new(18.0, 4.0),
            Vector2::new(18.0, 15.0),
            Vector2::new(29.0, 15.0),
        ],
        build_zones: vec![
            zone(2, 11, 5, 3, 1),
            zone(9, 5, 8, 3, 1),
            zone(19, 5, 4, 9, 1),
            zone(10, 12, 7, 3, 2),
            zone(20, 16, 8, 3, 4),
        ],
    }
}

pub fn standard_reactions() -> Vec<ReactionConfig> {
    vec![
        ReactionConfig {
            kind: ReactionKind::Melt,
            trigger: Element::Fire,
            required_status: StatusKind::Frozen,
            effect: ReactionEffect::DamageMultiplier { factor: 2.0 },
            consumes_status: true,
            priority: 1,
        },
        ReactionConfig {
            kind: ReactionKind::Conflagration,
            trigger: Element::Fire,
            required_status: StatusKind::Toxin,
            effect: ReactionEffect::AoeBurst {
                damage: 25.0,
                radius: 1.5,
            },
            consumes_status: true,
            priority: 2,
        },
        ReactionConfig {
            kind: ReactionKind::Vaporize,
            trigger: Element::Fire,
            required_status: StatusKind::Soaked,
            effect: ReactionEffect::DamageMultiplier { factor: 1.5 },
            consumes_status: true,
            priority: 3,
        },
        ReactionConfig {
            kind: ReactionKind::Freeze,
            trigger: Element::Ice,
            required_status: StatusKind::Soaked,
            effect: ReactionEffect::ApplyStatus {
                status: StatusKind::Frozen,
                duration_sec: 1.5,
            },
            consumes_status: true,
            priority: 4,
        },
        ReactionConfig {
            kind: ReactionKind::Quench,
            trigger: Element::Water,
            required_status: StatusKind::Burning,
            effect: ReactionEffect::DamageMultiplier { factor: 1.25 },
            consumes_status: true,
            priority: 5,
        },
        ReactionConfig {
            kind: ReactionKind::Corrode,
            trigger: Element::Nature,
            required_status: StatusKind::Cold,
            effect: ReactionEffect::DamageMultiplier { factor: 1.3 },
            consumes_status: false,
            priority: 6,
        },
    ]
}
