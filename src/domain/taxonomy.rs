use itertools::Itertools;

/// Verticals and their sub-verticals. The model must answer with exact strings from here.
pub const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "AI & Machine Learning",
        &[
            "Foundation Models/LLMs", "Agentic AI/Orchestration", "AI Safety/Evals",
            "RAG/Vector DBs/LLMOps", "MLOps", "Multimodal", "Synthetic Data/Labeling", "Edge AI",
            "AutoML/Low-code AI", "AI for Code",
        ],
    ),
    (
        "Developer Tools & Platforms",
        &[
            "IDEs/Code Intelligence", "CI/CD", "Testing/QA/Observability", "APIs/SDKs",
            "Feature Flags", "IaC/Policy-as-Code", "Package Mgmt", "Containers/K8s", "Serverless",
            "Internal Dev Portals",
        ],
    ),
    (
        "Data Infrastructure",
        &[
            "Data Lakes/Warehouses", "ETL/ELT", "Stream Processing", "Catalog/Lineage/Governance",
            "Data Quality/Observability", "Lakehouse/HTAP", "Time-series/Graph/Vector DBs",
            "Data Marketplace", "Privacy-preserving Analytics", "Virtualization/Federation",
        ],
    ),
    (
        "Cybersecurity",
        &[
            "IAM", "AppSec/DevSecOps", "Cloud Security/CNAPP", "Endpoint EDR/XDR",
            "Network/SASE/Zero-Trust", "Threat Intel/Hunting", "DSPM/Data Security",
            "Email Defense", "OT/ICS", "GRC",
        ],
    ),
    (
        "Fintech",
        &[
            "Payments/Orchestration", "BaaS/Core", "Lending/Credit", "Wealth/Trading",
            "Accounting/CFO", "Treasury/FX/Embedded", "Risk/Fraud/KYC/AML", "Insurtech",
            "RegTech", "Crypto/Web3 Finance",
        ],
    ),
    (
        "Insurance (Insurtech)",
        &[
            "Distribution", "Underwriting/Pricing", "Claims Automation", "Usage-based/Parametric",
            "Reinsurance/ILS", "Risk Data/Cat Models", "Health/Benefits", "Core Systems",
            "Fraud/SIU", "Broker Tools",
        ],
    ),
    (
        "Healthcare (HealthTech)",
        &[
            "Telehealth", "Clinical Decision Support", "Digital Therapeutics", "RPM",
            "EHR/Interoperability", "RCM", "Care Navigation", "Mental Health", "Employer Benefits",
            "Imaging/Diagnostics",
        ],
    ),
    (
        "Biotech & Life Sciences",
        &[
            "Drug Discovery (AI)", "Genomics", "Cell/Gene Therapy", "Synthetic Biology",
            "Lab Automation", "Bio-manufacturing", "Protein Engineering", "Comp Bio Platforms",
            "ELN/LIMS", "Biosecurity",
        ],
    ),
    (
        "MedTech & Devices",
        &[
            "Wearables", "Surgical Robots", "Diagnostics/POC", "Devices/Implants",
            "Rehab/Assistive", "Imaging HW", "Clinical Trial Tech", "Hospital Ops",
            "Digital Pathology", "FemTech",
        ],
    ),
    (
        "Retail, Commerce & Marketplaces",
        &[
            "eCommerce Platforms", "Marketplaces", "Checkout/Conversion", "Personalization",
            "Inventory/Pricing", "Returns", "Social Commerce", "BNPL", "Retail Media",
            "POS/Omnichannel",
        ],
    ),
    (
        "Sales, Marketing & CX",
        &[
            "CRM/RevOps", "Sales Enablement", "Marketing Automation", "AdTech/Attribution",
            "GenAI Creative", "Conversational AI/Contact Center", "VoC/Surveys",
            "Product Analytics", "Community", "CPQ/Contracts",
        ],
    ),
    (
        "Productivity & Collaboration",
        &[
            "Docs/Notes", "Work Mgmt/PMO", "Email/Chat/Video", "Knowledge/Search",
            "Automation/Agents", "Meeting Intelligence", "Whiteboarding", "OKRs/Goals",
            "File Sync", "Copilots",
        ],
    ),
    (
        "HRTech & Future of Work",
        &[
            "ATS", "HCM/Payroll/Benefits", "L&D", "Performance/OKRs", "Scheduling/WFM",
            "Background Checks", "Gig Platforms", "DEI/Engagement", "Compliance", "EOR",
        ],
    ),
    (
        "EdTech",
        &[
            "K-12", "Higher-Ed", "Test Prep", "Corporate LXP", "Language Learning", "STEM/Coding",
            "Tutor Marketplaces", "Credentialing/Skills Graph", "VR/AR Learning", "Teacher/Admin",
        ],
    ),
    (
        "LegalTech",
        &[
            "eDiscovery", "CLM", "Research/Drafting (AI)", "IP Mgmt", "Case Mgmt", "Compliance",
            "Notary/ID", "Litigation Funding", "Practice Mgmt", "Firm Ops/BI",
        ],
    ),
    (
        "GovTech & Defense",
        &[
            "Citizen Services", "Gov Data/Interop", "Public Safety", "Smart Cities",
            "Defense/Autonomy", "FinOps/Procurement", "Digital ID", "Civic/Elections",
            "ISR/Space", "RegTech for Agencies",
        ],
    ),
    (
        "Climate, Energy & Sustainability",
        &[
            "Renewables", "Grid/DER", "Building Energy Mgmt", "Carbon Accounting/MRV",
            "CCUS/Removal", "Batteries/Materials", "EV/Charging", "Circular/Recycle",
            "Ag-climate/Soil", "WaterTech",
        ],
    ),
    (
        "Mobility & Transportation",
        &[
            "Autonomy/ADAS", "MaaS", "Fleet/Telematics", "Routing/Dispatch", "Micro-mobility",
            "Rail/Maritime/Aviation Ops", "Aftermarket/Repair", "Parking/Tolling",
            "HMI/Infotainment", "Mobility Finance/Insurance",
        ],
    ),
    (
        "Supply Chain & Logistics",
        &[
            "WMS/TMS/YMS", "Freight Marketplaces", "Visibility/ETA", "Demand Planning",
            "S&OP/Inventory Opt", "Procurement/Sourcing", "Cross-border/Customs",
            "Last-mile/Returns", "Cold Chain", "Trade Finance",
        ],
    ),
    (
        "Manufacturing, Industrial & Robotics",
        &[
            "IIoT", "MES/SCADA/Twins", "Predictive Maintenance", "Visual Inspection (AI)",
            "AMRs/Robotics", "Additive/Adv Mfg", "PLM/CAD/CAM", "Factory Safety",
            "Industrial Analytics", "Spares Marketplaces",
        ],
    ),
    (
        "Construction & PropTech",
        &[
            "AEC/BIM", "Jobsite/Project Mgmt", "Estimating/Bidding", "Prop Mgmt/Leasing",
            "Broker/MLS/Portals", "Smart Buildings", "FM/Maintenance", "Mortgages/Transactions",
            "Tenant Experience", "Construc-Fin/Ins",
        ],
    ),
    (
        "Consumer Social & Media",
        &[
            "Social/Communities", "Creator Monetization", "Streaming/Short-video",
            "Audio/Podcasts", "Publishing", "UGC Safety", "Virtual Events", "Fan Engagement",
            "Dating", "Virtual Humans",
        ],
    ),
    (
        "Gaming & Interactive",
        &[
            "Studios", "Engines/Tools", "UGC/Modding", "eSports", "Cloud Gaming",
            "Live-ops/Analytics", "Monetization/IAP", "Web3 Gaming", "XR/Spatial",
            "Anti-cheat/Safety",
        ],
    ),
    (
        "Design, Creative & Content",
        &[
            "Design Systems/Proto", "Video/Audio Editing", "3D/Assets", "Creative Ops",
            "Templates/Stock", "Generative Media", "Localization", "Doc Automation",
            "Creative Collab", "DAM",
        ],
    ),
    (
        "Crypto, Web3 & Digital Assets",
        &[
            "Exchanges/Custody", "DeFi/Stablecoins", "Wallets/ID", "NFTs", "L1/L2/Infra",
            "Oracles/Indexing", "Compliance/Analytics", "RWA/Tokenization", "On-/Off-ramps",
            "Metaverse/Gaming",
        ],
    ),
    (
        "Telecom & Connectivity",
        &[
            "5G/Open RAN", "Edge/SD-WAN", "Satellite/Space Internet", "IoT/eSIM",
            "NetOps/Automation", "OSS/BSS", "Private 5G", "Spectrum", "Rural", "Telco Cloud",
        ],
    ),
    (
        "Semiconductors & Advanced Compute",
        &[
            "EDA/Chip Design", "AI Accelerators", "RISC-V", "Packaging/Advanced Nodes",
            "Photonic/Analog", "Verification/DFT", "Firmware/RTOS", "FPGA/Embedded",
            "Chiplets/Interconnect", "Foundry/SCM",
        ],
    ),
    (
        "Quantum Tech",
        &[
            "Hardware", "SDKs/Platforms", "Error-correction/Compilers", "Sensing", "Networking",
            "Cryo/Control", "Post-quantum Crypto", "Apps (Chem/Finance)", "Hybrid HPC+Quantum",
            "Benchmarks/Evals",
        ],
    ),
    (
        "Aerospace & SpaceTech",
        &[
            "Launch/Propulsion", "Satellites/Constellations", "Earth Observation", "Space Data",
            "In-space Mfg", "Servicing/Logistics", "GNSS/Nav", "SSA", "Insurance/Finance",
            "Dual-use",
        ],
    ),
    (
        "Agriculture & Food",
        &[
            "Precision Ag", "Ag Robotics/Drones", "Crop Models", "Traceability",
            "Alt Proteins/Cultivated", "Ag Finance/Marketplaces", "Food Safety", "Farm Mgmt",
            "Cold Chain", "Food Waste",
        ],
    ),
    (
        "Travel & Hospitality",
        &[
            "Booking/Meta", "Revenue Mgmt", "Guest Experience", "Airline/Rail Ops",
            "Tours/Activities", "Corp Travel/Expense", "Loyalty", "Events/MICE", "Travel Risk",
            "Sustainability/Offsets",
        ],
    ),
    (
        "Sports & Wellness",
        &[
            "Athlete Analytics", "Fan/Ticketing", "Connected Fitness", "Nutrition",
            "Mental Wellness", "Recovery/Physio", "Wearables/Coaching", "Venue Ops",
            "Media/Rights", "eSports x Sports",
        ],
    ),
    (
        "Household, Family & Pets",
        &[
            "Parenting/Child Dev", "STEM Kits", "Home Services", "Smart Home/IoT",
            "Family Banking", "Elder Care", "Pet Health/Insurance", "Home Fitness",
            "Safety/Monitoring", "Personal Agents",
        ],
    ),
    (
        "Materials, Mining & Industrial Resources",
        &[
            "Advanced Materials", "Critical Minerals", "Geospatial/Exploration",
            "Safety/Env Monitoring", "Recycling/Upcycling", "Process Opt",
            "Industrial Marketplaces", "Additives/Chemicals", "Coatings", "Scale-up",
        ],
    ),
    (
        "Financial & Corporate Software",
        &[
            "ERP/GL", "Spend/Procure", "AP/AR/Collections", "Tax/Compliance", "Close/Consol",
            "BI/FP&A", "Treasury/Cash", "Billing/RevRec", "Quote-to-Cash", "IR/ESG",
        ],
    ),
    (
        "Privacy, Compliance & Trust",
        &[
            "Consent/Prefs", "DPaaS", "Sovereign Cloud", "PII Discovery/Tokenization",
            "Audit/Monitoring", "Policy-as-Code", "AI Governance/Ethics", "Third-party Risk",
            "Secure Collab", "Content Safety",
        ],
    ),
    (
        "IoT, Edge & Hardware",
        &[
            "Sensors", "Edge Compute/Gateways", "Digital Twins", "Remote Monitoring",
            "Firmware/OTA", "Industrial Edge", "Smart City Devices", "Building IoT",
            "Consumer Devices", "Device Security",
        ],
    ),
    (
        "Nonprofit & Impact",
        &[
            "Philanthropy", "Impact MRV", "Fundraising/CRM", "Civic/Open Data",
            "Education Access", "Health Access", "Climate/Conservation", "Refugee/Disaster",
            "Gov–NGO", "Social Finance",
        ],
    ),
];

/// The taxonomy as a JSON object, verticals in table order.
pub fn taxonomy_json() -> String {
    let entries = TAXONOMY
        .iter()
        .map(|(vertical, subs)| {
            format!(
                "{}: {}",
                serde_json::Value::String(vertical.to_string()),
                serde_json::json!(subs)
            )
        })
        .join(", ");

    format!("{{{}}}", entries)
}
