use chrono::{DateTime, Duration, Utc};

use crate::model::{AirdropStatus, NewAirdrop};

struct Sample {
    name: &'static str,
    description: &'static str,
    status: AirdropStatus,
    platform: &'static str,
    estimated_value: &'static str,
    start_offset_days: i64,
    end_offset_days: i64,
    featured: bool,
    image_url: &'static str,
    project_url: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        name: "Ethereum Protocol",
        description: "New L2 solution for Ethereum with major token incentives for early adopters. Complete simple tasks to qualify.",
        status: AirdropStatus::Active,
        platform: "Ethereum",
        estimated_value: "$500-$1000",
        start_offset_days: 0,
        end_offset_days: 5,
        featured: true,
        image_url: "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400",
        project_url: "https://example.com/ethereum-protocol",
    },
    Sample {
        name: "Solana DeFi Platform",
        description: "Next-gen DeFi platform launching on Solana with massive airdrop for early users. Join waitlist now!",
        status: AirdropStatus::Upcoming,
        platform: "Solana",
        estimated_value: "$200-$800",
        start_offset_days: 2,
        end_offset_days: 16,
        featured: true,
        image_url: "https://images.unsplash.com/photo-1639322537228-f710d846310a?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400",
        project_url: "https://example.com/solana-defi",
    },
    Sample {
        name: "BSC Gaming Project",
        description: "Revolutionary Play-to-Earn game launching on BSC with token airdrop for beta testers and community members.",
        status: AirdropStatus::Active,
        platform: "BSC",
        estimated_value: "$100-$500",
        start_offset_days: -5,
        end_offset_days: 10,
        featured: true,
        image_url: "https://images.unsplash.com/photo-1642104704074-907c0698cbd9?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400",
        project_url: "https://example.com/bsc-gaming",
    },
    Sample {
        name: "Layer3 Protocol",
        description: "New cross-chain bridge solution with airdrop for early adopters. Complete simple tasks to qualify for the airdrop.",
        status: AirdropStatus::Active,
        platform: "Ethereum",
        estimated_value: "$300-$600",
        start_offset_days: -3,
        end_offset_days: 12,
        featured: false,
        image_url: "https://images.unsplash.com/photo-1639762681057-408e52192e55?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400",
        project_url: "https://example.com/layer3",
    },
    Sample {
        name: "NFT Marketplace",
        description: "Revolutionary NFT marketplace with governance token airdrop for early users and creators.",
        status: AirdropStatus::Upcoming,
        platform: "Polygon",
        estimated_value: "$150-$400",
        start_offset_days: 3,
        end_offset_days: 18,
        featured: false,
        image_url: "https://images.unsplash.com/photo-1620321023374-d1a68fbc720d?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400",
        project_url: "https://example.com/nft-marketplace",
    },
];

/// The demo airdrops inserted by the sample-data endpoint, dated relative to `now`.
pub fn sample_airdrops(now: DateTime<Utc>) -> Vec<NewAirdrop> {
    SAMPLES
        .iter()
        .map(|s| NewAirdrop {
            name: s.name.to_string(),
            description: s.description.to_string(),
            status: s.status,
            platform: s.platform.to_string(),
            estimated_value: Some(s.estimated_value.to_string()),
            start_date: Some(now + Duration::days(s.start_offset_days)),
            end_date: Some(now + Duration::days(s.end_offset_days)),
            timing: None,
            image_url: Some(s.image_url.to_string()),
            project_url: Some(s.project_url.to_string()),
            featured: s.featured,
            notion_id: None,
        })
        .collect()
}
