//! Built-in legal pages seeded by the worker.

pub const SLUG_PRIVACY_POLICY: &str = "privacy-policy";
pub const SLUG_TERMS_OF_SERVICE: &str = "terms-of-service";

#[derive(Debug, Clone, Copy)]
pub struct DefaultLegalPage {
    pub slug: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

const PRIVACY_POLICY: &str = r#"<h1>Privacy Policy</h1>
<p>This policy explains which personal information the platform collects and how it is used.</p>
<h2>1. Information we collect</h2>
<ul>
  <li>Account details: name, email address, phone number and username.</li>
  <li>Listing details: property descriptions, images and pricing you publish.</li>
  <li>Usage data: IP address, browser information and pages viewed.</li>
</ul>
<h2>2. How we use it</h2>
<p>To display and manage listings, connect owners with interested buyers, process premium
purchases and send account notifications.</p>
<h2>3. Sharing</h2>
<p>Contact details you place on a listing are shown to visitors. We do not sell personal data.</p>
<h2>4. Your choices</h2>
<p>You can update or delete your account and listings at any time from your profile.</p>
<h2>5. Contact</h2>
<p>Questions about this policy can be sent through the contact form.</p>
"#;

const TERMS_OF_SERVICE: &str = r#"<h1>Terms of Service</h1>
<p>By creating an account or using the platform you agree to these terms.</p>
<h2>1. Accounts</h2>
<p>You are responsible for the accuracy of your account information and for keeping your
password secret.</p>
<h2>2. Listings</h2>
<ul>
  <li>Listings must describe real properties you are entitled to offer.</li>
  <li>Images must be genuine photographs of the listed property.</li>
  <li>Administrators may reject, flag or remove content that breaks these rules.</li>
</ul>
<h2>3. Premium listings</h2>
<p>Premium plans run for the purchased period and end automatically. Payments are not
refundable once a plan is active.</p>
<h2>4. Liability</h2>
<p>The platform connects buyers and sellers and is not a party to any property transaction.</p>
"#;

pub const DEFAULT_LEGAL_PAGES: &[DefaultLegalPage] = &[
    DefaultLegalPage {
        slug: SLUG_PRIVACY_POLICY,
        title: "Privacy Policy",
        content: PRIVACY_POLICY,
    },
    DefaultLegalPage {
        slug: SLUG_TERMS_OF_SERVICE,
        title: "Terms of Service",
        content: TERMS_OF_SERVICE,
    },
];
