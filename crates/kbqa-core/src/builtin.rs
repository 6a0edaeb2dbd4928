//! Hand-authored taxonomy and site knowledge.
//!
//! Order matters: topics are the classifier tie-break, sections are the
//! ranking tie-break.

use crate::error::Result;
use crate::knowledge::{PageSpec, SectionSpec};
use crate::taxonomy::Taxonomy;
use crate::types::{PageId, Topic, TopicId};

struct TopicDef {
    id: &'static str,
    name: &'static str,
    keywords: &'static [&'static str],
    pages: &'static [&'static str],
    fallbacks: &'static [&'static str],
}

const TOPICS: &[TopicDef] = &[
    TopicDef {
        id: "company",
        name: "Company Information",
        keywords: &["microhabitat", "who", "founded", "mission", "about", "history", "team", "founders", "orlane", "alexandre"],
        pages: &["/about", "/"],
        fallbacks: &["services", "contact"],
    },
    TopicDef {
        id: "services",
        name: "Services",
        keywords: &["services", "offer", "provide", "outdoor", "indoor", "farm", "vertical", "rooftop", "garden"],
        pages: &["/outdoor-farm", "/indoor-farm", "/"],
        fallbacks: &["company", "pricing"],
    },
    TopicDef {
        id: "education",
        name: "Educational Programs",
        keywords: &["education", "workshop", "learn", "training", "program", "activities", "school", "teaching"],
        pages: &["/educational-activities", "/schools", "/community-engagement"],
        fallbacks: &["services", "clients"],
    },
    TopicDef {
        id: "clients",
        name: "Client Types",
        keywords: &["client", "corporation", "corporate", "school", "real estate", "property", "building", "commercial"],
        pages: &["/corporations", "/schools", "/commercial-real-estate"],
        fallbacks: &["services", "benefits"],
    },
    TopicDef {
        id: "locations",
        name: "Locations & Cities",
        keywords: &["where", "location", "city", "cities", "montreal", "toronto", "paris", "new york", "operate", "coverage"],
        pages: &["/cities", "/contact"],
        fallbacks: &["company", "contact"],
    },
    TopicDef {
        id: "pricing",
        name: "Pricing & Cost",
        keywords: &["cost", "price", "pricing", "expensive", "afford", "budget", "investment", "roi", "return"],
        pages: &["/roi-calculator", "/contact"],
        fallbacks: &["services", "benefits"],
    },
    TopicDef {
        id: "benefits",
        name: "Benefits & Impact",
        keywords: &["benefit", "advantage", "impact", "why", "value", "esg", "sustainable", "environment", "green"],
        pages: &["/", "/about", "/commercial-real-estate"],
        fallbacks: &["certifications", "services"],
    },
    TopicDef {
        id: "certifications",
        name: "Certifications",
        keywords: &["certification", "leed", "well", "boma", "certified", "green building", "credits", "points"],
        pages: &["/commercial-real-estate", "/corporations"],
        fallbacks: &["benefits", "services"],
    },
    TopicDef {
        id: "contact",
        name: "Contact Information",
        keywords: &["contact", "email", "phone", "reach", "talk", "address", "office", "book", "demo", "meeting"],
        pages: &["/contact", "/"],
        fallbacks: &["locations", "company"],
    },
    TopicDef {
        id: "careers",
        name: "Careers & Jobs",
        keywords: &["career", "job", "work", "hiring", "position", "employment", "join", "team"],
        pages: &["/careers"],
        fallbacks: &["company", "contact"],
    },
    TopicDef {
        id: "partnerships",
        name: "Partnerships",
        keywords: &["partner", "partnership", "collaborate", "collaboration", "together"],
        pages: &["/partnerships"],
        fallbacks: &["company", "contact"],
    },
    TopicDef {
        id: "faq",
        name: "FAQ",
        keywords: &["faq", "question", "common", "frequently"],
        pages: &["/faq"],
        fallbacks: &["company", "services"],
    },
    TopicDef {
        id: "produce",
        name: "Produce & Growing",
        keywords: &["grow", "vegetable", "herb", "produce", "harvest", "plant", "crop", "food", "tomato", "lettuce"],
        pages: &["/outdoor-farm", "/indoor-farm", "/"],
        fallbacks: &["services", "benefits"],
    },
    TopicDef {
        id: "maintenance",
        name: "Maintenance",
        keywords: &["maintain", "maintenance", "care", "upkeep", "water", "visit"],
        pages: &["/outdoor-farm", "/indoor-farm", "/faq"],
        fallbacks: &["services", "pricing"],
    },
];

const DEFAULT_TOPICS: &[&str] = &["company", "services", "faq"];

struct SectionDef {
    page: &'static str,
    title: &'static str,
    keywords: &'static [&'static str],
    content: &'static str,
}

const SECTIONS: &[SectionDef] = &[
    SectionDef {
        page: "/",
        title: "Company Overview",
        keywords: &["microhabitat", "company", "overview", "urban farm", "network"],
        content: "MicroHabitat is the world's largest network of urban farms, founded in 2016 in Montreal by childhood friends Orlane and Alexandre. We transform underutilized urban spaces (rooftops, terraces, lobbies and courtyards) into productive ecological farms. Our mission is to reconnect communities with nature and fresh, local food through regenerative agriculture. We operate across North America and Europe, managing over 500 urban farms that produce fresh vegetables, herbs and edible flowers.",
    },
    SectionDef {
        page: "/",
        title: "Impact Statistics",
        keywords: &["impact", "statistics", "co2", "carbon", "biodiversity", "heat island"],
        content: "Over 500 urban farms installed, 50,000+ kg of produce harvested annually, 2 million+ kg of CO2 offset, and partnerships across 20+ cities. Our farms reduce the urban heat island effect by up to 5°C, support pollinators and biodiversity, and provide fresh food within steps of where people live and work.",
    },
    SectionDef {
        page: "/about",
        title: "Our Story",
        keywords: &["story", "founded", "founders", "history", "orlane", "alexandre"],
        content: "Founded in 2016 by Orlane and Alexandre, two childhood friends from Montreal who shared a passion for sustainable food systems and urban innovation. What started as a single rooftop garden has grown into the world's largest network of urban farms, transforming underused urban spaces into productive, beautiful farms.",
    },
    SectionDef {
        page: "/about",
        title: "Our Values",
        keywords: &["values", "organic", "sustainability", "community", "innovation"],
        content: "We believe in sustainability, community and innovation. We use organic growing methods without synthetic pesticides or fertilizers, partner with local food banks and community organizations, and continuously refine our farming techniques to maximize yield while minimizing environmental footprint.",
    },
    SectionDef {
        page: "/outdoor-farm",
        title: "Outdoor Urban Farming Services",
        keywords: &["outdoor", "rooftop", "terrace", "courtyard", "installation", "design"],
        content: "Our outdoor urban farming services transform rooftops, terraces, courtyards and other outdoor spaces into productive gardens. Services include design and consultation, installation of raised beds, planters and irrigation, regular maintenance visits by our farmers, seasonal planting and crop rotation, harvesting at peak freshness, and produce delivery.",
    },
    SectionDef {
        page: "/outdoor-farm",
        title: "What We Grow Outdoors",
        keywords: &["grow", "vegetables", "herbs", "tomatoes", "lettuce", "flowers"],
        content: "Our outdoor farms grow leafy greens (lettuce, kale, spinach, arugula), tomatoes, peppers, cucumbers and zucchini, beans and peas, root vegetables (carrots, radishes, beets), herbs (basil, mint, cilantro, parsley, rosemary, thyme) and edible flowers. All produce is grown organically without synthetic pesticides.",
    },
    SectionDef {
        page: "/indoor-farm",
        title: "Indoor Vertical Farming",
        keywords: &["indoor", "vertical", "lobby", "atrium", "year-round"],
        content: "Our indoor farming solutions bring year-round growing to lobbies, atriums and common areas. Using vertical farming technology and controlled environment agriculture, we grow fresh produce regardless of weather or season. Indoor farms are low-maintenance, beautiful, and provide biophilic benefits for building occupants.",
    },
    SectionDef {
        page: "/indoor-farm",
        title: "Indoor Growing Technology",
        keywords: &["hydroponics", "aeroponics", "led", "technology", "microgreens"],
        content: "Our indoor farms use hydroponics and aeroponics systems that use up to 95% less water than traditional farming while maximizing crop yields. LED grow lights provide the optimal light spectrum, and automated irrigation and climate control keep produce consistent. We specialize in leafy greens, herbs and microgreens indoors.",
    },
    SectionDef {
        page: "/educational-activities",
        title: "Educational Programs",
        keywords: &["education", "workshop", "team-building", "seminar", "activities"],
        content: "We offer hands-on workshops where participants learn to grow their own food, corporate team-building activities centered on planting and harvesting, school programs about sustainable agriculture and nutrition, community events and seasonal celebrations, and sustainability seminars for property managers and corporate leaders.",
    },
    SectionDef {
        page: "/corporations",
        title: "Corporate Urban Farming",
        keywords: &["corporate", "corporation", "employee", "wellness", "office"],
        content: "For corporations, urban farming delivers employee wellness improvements and brand differentiation. Corporate programs include rooftop and terrace farms at office buildings, indoor farms in lobbies, team-building workshops and harvest events, produce sharing for employees, and sustainability reporting.",
    },
    SectionDef {
        page: "/corporations",
        title: "Corporate ESG Benefits",
        keywords: &["esg", "environmental", "social", "governance", "sustainability"],
        content: "Urban farms support corporate ESG goals. Environmental: reduce carbon footprint, support biodiversity, decrease the urban heat island effect. Social: improve employee wellness, provide fresh food access, support community food banks. Governance: demonstrate sustainability leadership and meet stakeholder expectations.",
    },
    SectionDef {
        page: "/schools",
        title: "School Programs",
        keywords: &["school", "students", "curriculum", "children", "university"],
        content: "Our school programs bring urban agriculture into educational settings. Students learn about plant biology, nutrition, sustainability and food systems through hands-on experience, with curriculum-aligned lessons, garden installation and maintenance, harvest celebrations and farm-to-cafeteria initiatives.",
    },
    SectionDef {
        page: "/commercial-real-estate",
        title: "Real Estate Solutions",
        keywords: &["real estate", "property", "tenant", "amenity", "owners"],
        content: "For commercial real estate owners and property managers, urban farms increase property values by 10-20%, attract and retain tenants with unique amenities, earn green building certification credits, and differentiate properties in competitive markets. We handle everything from design to ongoing maintenance.",
    },
    SectionDef {
        page: "/commercial-real-estate",
        title: "Green Building Certifications",
        keywords: &["leed", "well", "boma", "fitwel", "certification", "credits"],
        content: "Our farms help buildings earn certification credits. LEED: Sustainable Sites, Water Efficiency and Innovation credits, potentially 8+ points. WELL Building Standard: Nourishment, Mind and Community credits. BOMA BEST: environmental performance and innovation points. Fitwel: healthy food access and outdoor space credits. We provide documentation support for applications.",
    },
    SectionDef {
        page: "/cities",
        title: "Our Locations",
        keywords: &["locations", "cities", "montreal", "toronto", "paris", "new york"],
        content: "We operate across North America and Europe. North America: Montreal (headquarters), Toronto, Vancouver, New York, Chicago, Boston, Philadelphia, Washington DC. Europe: Paris (European headquarters), Amsterdam, Brussels, London. If your city is not listed, contact us to discuss possibilities.",
    },
    SectionDef {
        page: "/contact",
        title: "Contact Information",
        keywords: &["contact", "email", "office", "address", "demo"],
        content: "Email info@microhabitat.com. Montreal office (HQ): 5333 Casgrain Ave, Suite 102. Toronto office: 180 John Street, Suite 402. New York office: 1123 Broadway, Suite 1012. Paris office: 25 Rue du Petit Musc, 75004. Book a demo at www.microhabitat.com to schedule a free consultation.",
    },
    SectionDef {
        page: "/roi-calculator",
        title: "Pricing and Investment",
        keywords: &["pricing", "price", "cost", "quote", "budget", "investment", "roi"],
        content: "Pricing varies with project scope, and the cost depends on space size, indoor versus outdoor installation, design complexity, maintenance frequency and educational programming. Every package includes design consultation, materials and plants, installation, maintenance, harvesting and delivery. ROI typically includes higher property values, tenant attraction and certification credits. Contact us for a custom quote.",
    },
    SectionDef {
        page: "/faq",
        title: "Frequently Asked Questions",
        keywords: &["faq", "questions", "participate"],
        content: "How much does it cost? Pricing varies by project size and scope; contact us for a quote. Who maintains the farm? Our professional farmers handle all maintenance, watering, planting and harvesting. How often do you visit? Typically weekly or bi-weekly depending on the season. Can I participate? Yes, we offer workshops and optional hands-on involvement.",
    },
    SectionDef {
        page: "/faq",
        title: "Maintenance and Care",
        keywords: &["maintenance", "care", "watering", "upkeep", "visit"],
        content: "We provide full-service maintenance so you don't have to do anything. Our farmers handle watering and irrigation, soil health and organic fertilization, organic pest management, seasonal planting and crop rotation, harvesting, pruning and winter preparation for outdoor farms. Visits are typically weekly or bi-weekly.",
    },
    SectionDef {
        page: "/careers",
        title: "Careers at MicroHabitat",
        keywords: &["career", "careers", "job", "jobs", "hiring", "positions"],
        content: "Join our team of urban farmers, designers and sustainability professionals. Positions include urban farmers, farm managers, sales and partnerships, operations and logistics, and design specialists. We offer competitive compensation and meaningful environmental work. Check www.microhabitat.com/careers for current openings.",
    },
    SectionDef {
        page: "/partnerships",
        title: "Partnership Opportunities",
        keywords: &["partner", "partnership", "collaboration", "food bank"],
        content: "We partner with organizations aligned with our mission: food bank partnerships for produce donations, corporate sustainability partnerships, academic research collaborations, technology partnerships, and municipal partnerships. To partner with us, write to info@microhabitat.com.",
    },
    SectionDef {
        page: "/community-engagement",
        title: "Community Programs",
        keywords: &["community", "donations", "volunteer", "public"],
        content: "Urban farms should benefit entire communities. Our community programs include produce donations to local food banks, free workshops for residents, partnerships with community gardens, local employment opportunities, and educational events open to the public.",
    },
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

pub(crate) fn taxonomy() -> Result<Taxonomy> {
    let topics = TOPICS
        .iter()
        .map(|t| Topic {
            id: TopicId::new(t.id),
            name: t.name.to_string(),
            keywords: strings(t.keywords),
            pages: t.pages.iter().map(|p| PageId::new(*p)).collect(),
            fallbacks: t.fallbacks.iter().map(|f| TopicId::new(*f)).collect(),
        })
        .collect();
    Taxonomy::new(topics, DEFAULT_TOPICS.iter().map(|d| TopicId::new(*d)).collect())
}

/// Sections grouped by page, preserving declaration order.
pub(crate) fn pages() -> Vec<PageSpec> {
    let mut pages: Vec<PageSpec> = Vec::new();
    for def in SECTIONS {
        let spec = SectionSpec {
            title: def.title.to_string(),
            content: def.content.to_string(),
            keywords: strings(def.keywords),
        };
        match pages.iter_mut().find(|p| p.page.as_str() == def.page) {
            Some(page) => page.sections.push(spec),
            None => pages.push(PageSpec { page: PageId::new(def.page), sections: vec![spec] }),
        }
    }
    pages
}
