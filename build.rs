use vergen_gitcl::{Emitter, GitclBuilder};

// exposes VERGEN_GIT_SHA / VERGEN_GIT_BRANCH to the health endpoint
fn main() -> anyhow::Result<()> {
    let gitcl = GitclBuilder::default()
        .branch(true)
        .sha(true)
        .commit_timestamp(true)
        .build()?;
    Emitter::default().add_instructions(&gitcl)?.emit()?;

    Ok(())
}
