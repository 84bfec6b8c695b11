// Draft session: sections, draft text, diagram scene, timer, and the
// lifecycle manager that ties them to persistent storage.

pub mod draft;
pub mod manager;
pub mod scene;
pub mod sections;
pub mod timer;
